pub mod charge;
pub mod pix;
