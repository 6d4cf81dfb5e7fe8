//! Linear multi-step wizards.
//!
//! A wizard only knows its position. Whatever gates advancing (field
//! validation for the pricing form, a selection for the lens wizard) is the
//! caller's check.

use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

/// A step of a linear wizard.
pub trait Step: Copy + PartialEq + 'static {
    const FIRST: Self;
    /// All steps, first to last. Starts with [`Step::FIRST`].
    const ORDER: &'static [Self];
}

/// Position within a wizard of `S` steps.
///
/// Persist [`Wizard::index`] and rebuild with [`Wizard::at`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wizard<S> {
    index: usize,
    steps: PhantomData<S>,
}

impl<S: Step> Default for Wizard<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Step> Wizard<S> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            index: 0,
            steps: PhantomData,
        }
    }

    /// Wizard positioned at `index`, clamped to the last step.
    #[must_use]
    pub fn at(index: usize) -> Self {
        Self {
            index: index.min(S::ORDER.len().saturating_sub(1)),
            steps: PhantomData,
        }
    }

    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn current(&self) -> S {
        S::ORDER.get(self.index).copied().unwrap_or(S::FIRST)
    }

    #[must_use]
    pub const fn is_first(&self) -> bool {
        self.index == 0
    }

    #[must_use]
    pub const fn is_last(&self) -> bool {
        self.index + 1 >= S::ORDER.len()
    }

    #[must_use]
    pub const fn step_count(&self) -> usize {
        S::ORDER.len()
    }

    /// Move forward. Returns `false` on the last step.
    pub const fn advance(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.index += 1;
        true
    }

    /// Move back. Returns `false` on the first step.
    pub const fn back(&mut self) -> bool {
        if self.is_first() {
            return false;
        }
        self.index -= 1;
        true
    }
}

/// Pricing request form: contact details, then requirements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingStep {
    Contact,
    Requirements,
}

impl Step for PricingStep {
    const FIRST: Self = Self::Contact;
    const ORDER: &'static [Self] = &[Self::Contact, Self::Requirements];
}

/// Lens customization: lens type, lens options, review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LensStep {
    LensType,
    LensOptions,
    Review,
}

impl Step for LensStep {
    const FIRST: Self = Self::LensType;
    const ORDER: &'static [Self] = &[Self::LensType, Self::LensOptions, Self::Review];
}
