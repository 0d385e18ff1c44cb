pub mod geo;
pub mod scene;
pub mod track;
