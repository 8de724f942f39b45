pub mod deploy;
pub mod keygen;
pub mod state;
