#![allow(dead_code)]

mod fixture;
mod server;

pub use fixture::*;
pub use server::*;
