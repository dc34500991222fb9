//! Authorization module providing role- and ownership-based access control.
//!
//! Every request is authorized in two steps:
//! 1. [`decide`] maps the actor's role and the requested action to either a
//!    denial or a [`Predicate`] describing which rows the actor may touch.
//! 2. The repository applies that predicate inside the same statement that
//!    reads or mutates the row, so a row outside the actor's scope behaves
//!    exactly like a row that does not exist.
//!
//! Repositories never construct predicates themselves.

mod error;
mod policy;

pub use error::AuthzError;
pub use policy::{
    Action, Actor, AssignmentAction, FeedbackAction, MaterialAction, Predicate, RowState,
    UserAction, decide,
};
