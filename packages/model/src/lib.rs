//! # Protoform Model
//!
//! Document model for tree-structured protocol forms.
//!
//! A protocol form is a tree of fields. Each field is an insertion-ordered
//! attribute map classified by an input type; the tree lives in a flat
//! [`Arena`] addressed by stable [`NodeId`] handles, so parent/child links
//! are index fields rather than a cyclic reference graph.
//!
//! The crate also owns the document boundary: an external parser supplies
//! one [`ElementData`] per source element and receives the same shape back
//! from [`serialize_tree`]. No markup is parsed here.

pub mod arena;
pub mod element;
pub mod error;
pub mod field;
pub mod id;
pub mod visitor;

pub use arena::{Arena, Descendants, NodeId};
pub use element::{build_tree, serialize_tree, ElementData, ELEMENT};
pub use error::{ModelError, ModelResult};
pub use field::{Field, InputType};
pub use id::get_document_id;
