pub mod burst;
pub mod panels;
pub mod plot;
pub mod population;
pub mod table;
