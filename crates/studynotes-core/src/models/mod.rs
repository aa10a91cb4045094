//! Data models for study-notes entities.
//!
//! This module contains the structures exchanged with the backend:
//!
//! - `Course`, `NewCourse`: courses a user is enrolled in
//! - `Note`, `NewNote`, `NoteUpdate`: notes per course and chapter
//! - `Summary`, `GenerateSummary`: generated chapter summaries
//! - `PracticeTest`, `Question`: generated practice tests

pub mod course;
pub mod note;
pub mod summary;

pub use course::{Course, NewCourse};
pub use note::{group_by_chapter, NewNote, Note, NoteUpdate};
pub use practice_test::{GeneratePracticeTest, NewPracticeTest, PracticeTest, Question};
pub use summary::{sort_by_chapter, GenerateSummary, Summary};
