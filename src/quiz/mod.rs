// src/quiz/mod.rs

pub mod attempt;
pub mod authoring;
pub mod grading;
pub mod presentation;
pub mod registry;
pub mod search;
