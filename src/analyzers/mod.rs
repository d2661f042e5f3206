pub mod c;

pub use c::CAnalyzer;
