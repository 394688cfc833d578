//! Interactive arrangement canvas.
//!
//! The drag/snap logic lives in [`arrange`](crate::arrange) and is toolkit
//! independent.  With the `canvas-gtk` feature enabled,
//! [`gtk::run_main_loop`] shows it in a GTK4 window and takes over the main
//! thread.

#[cfg(feature = "canvas-gtk")]
pub mod gtk;
