//! Order-reversal of template lines.
//!
//! Inverted block lines have their tokens reversed after parsing so
//! that the expander binds its fastest-varying choice to the mirrored
//! group, then every expansion is reversed back to restore word order.

use crate::expand::Expansion;
use crate::template::Template;

/// Reverse the top-level tokens of a template. Each group stays a
/// single unit; the order of its alternatives is untouched.
///
/// `A [ B C ] D [ E F ]` becomes `[ E F ] D [ B C ] A`.
#[must_use]
pub fn invert_template(mut template: Template) -> Template {
    template.tokens.reverse();
    template
}

/// Undo [`invert_template`] on an expansion.
#[must_use]
pub fn restore_order(expansion: Expansion) -> Expansion {
    let mut words = expansion.into_words();
    words.reverse();
    Expansion::new(words)
}
