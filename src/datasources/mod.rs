pub mod products;
pub mod weather;

pub use products::load_products;
pub use weather::load_weather;
