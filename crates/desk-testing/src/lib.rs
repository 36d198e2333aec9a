//! Testing utilities and fakes for desk binding

pub mod testing;

pub use testing::*;

pub mod prelude {
    pub use crate::testing::*;
}
