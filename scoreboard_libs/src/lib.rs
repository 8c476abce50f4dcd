pub mod api;
pub mod domjudge;
pub mod normalize;
pub mod sample;
