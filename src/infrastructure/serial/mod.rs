pub mod port;

pub use port::{SerialLinePort, SerialPortOpener};
