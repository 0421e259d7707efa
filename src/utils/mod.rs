// src/utils/mod.rs

pub mod csv;
pub mod hash;
pub mod jwt;
