pub mod planet;
pub mod planet_source;
pub mod planet_source_swapi;
pub mod planet_source_mock;
pub mod planet_source_factory;
pub mod destroy_service;

pub mod screen;
pub mod workflow;
pub mod death_star_machine;
pub mod death_star_flags;
