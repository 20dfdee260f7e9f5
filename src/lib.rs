// src/lib.rs

pub mod api;
pub mod auth;
pub mod chat;
pub mod config;
pub mod kakao;
pub mod llm;
pub mod persona;
pub mod state;
