// Synthesis engine - oscillators, modulation generators and the render path

pub mod contour;
pub mod engine;
pub mod envelope;
pub mod fixed;
pub mod lfo;
pub mod limiter;
pub mod mixer;
pub mod oscillator;
pub mod patch;
pub mod reverb;
pub mod tables;
