mod signal;

pub use signal::Signal;
