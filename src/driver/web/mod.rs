mod driver;

pub use driver::PlaywrightSession;
