pub mod grid;
pub mod hexgrid;
pub mod intensity;
pub mod point_id;
