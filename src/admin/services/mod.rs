//! External collaborators of the admin service: the relational store and
//! the image host.

pub mod images;
pub mod sql;
