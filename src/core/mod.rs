pub mod cancel;
pub mod keys;
pub mod link;
pub mod monitor;
pub mod protocol;
pub mod rig;
pub mod session;
pub mod supervisor;
pub mod transport;
