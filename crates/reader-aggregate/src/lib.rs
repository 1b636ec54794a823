//! C5: fans N `Browser::scrape` streams into slot-array emissions (§4.5).

pub mod scrape_many;

pub use scrape_many::scrape_many;
