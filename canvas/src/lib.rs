//! Interactive element transform engine for the product customizer.
//!
//! Shoppers place text, stickers and printed images on a product mockup and
//! move, rotate and scale them with mouse or touch. This crate owns that
//! interaction: it turns pointer and touch input into transform updates,
//! keeps every element's `{position, angle, scale, zIndex}` in one store,
//! keeps a stacking order, and warns (without blocking) when anything leaves
//! the product's printable area. Property menus talk to the engine over a
//! deferred event bus, so either side can start a change. The host renders
//! and persists what the returned [`engine::Action`]s describe.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level [`engine::Engine`] and testable [`engine::EngineCore`] |
//! | [`doc`] | Element types, sparse patches and the element store |
//! | [`layers`] | Stacking order (z-index list) |
//! | [`gesture`] | Drag, rotate, button-zoom and pinch controllers |
//! | [`hit`] | Hit-testing of element bodies and handles |
//! | [`bounds`] | Print-area checking and the debounced overlay flag |
//! | [`bus`] | Deferred publish/subscribe and the canvas events |
//! | [`menu`] | Property-menu validation, display and sync |
//! | [`input`] | Selection, active gesture and cursor state |
//! | [`mockup`] | Serializable snapshot for cart and checkout |
//! | [`geom`] | Points, rects, print-area resolution, rotation math |
//! | [`config`] | Engine settings and environment overrides |
//! | [`consts`] | Default values for settings and handle geometry |

pub mod bounds;
pub mod bus;
pub mod config;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod geom;
pub mod gesture;
pub mod hit;
pub mod input;
pub mod layers;
pub mod menu;
pub mod mockup;
