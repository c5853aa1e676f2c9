pub mod geo;
pub mod itinerary;
pub mod trip;
