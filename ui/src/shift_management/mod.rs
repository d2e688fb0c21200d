//! Shift admin island: editing the translated shift-slot warnings and member
//! qualifications.

pub mod editor;
mod view;

pub use view::EntryEditorCard;
