//! Core library for the freedom-dashboard application.
//!
//! The library loads the Freedom in the World country and territory scores,
//! normalizes them into an immutable [`model::CanonicalTable`], and derives
//! everything the dashboard shows from it. Loaders live under
//! [`freedom::dashboard::io`], the schema mapping in
//! [`freedom::dashboard::normalize`], the filter pipeline and page scoping in
//! [`freedom::dashboard::filter`], statistics in
//! [`freedom::dashboard::aggregate`], and the chart and table inputs in
//! [`freedom::dashboard::present`].

pub mod freedom;

pub use freedom::dashboard::{
    DashboardError, Result, aggregate, error, export, facets, filter, io, model, normalize,
    present, session,
};
