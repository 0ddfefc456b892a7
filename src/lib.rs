//! # gumbel-nas
//!
//! Differentiable neural architecture search with Gumbel-softmax supernets.
//!
//! A supernet is an ordinary network in which some layers are
//! [`nas::MixtureLayer`]s: each holds several candidate operations and a
//! learnable preference vector. Every forward pass draws a relaxed one-hot
//! sample over the candidates and mixes their outputs, so the preference
//! vectors receive gradients alongside the network weights.
//! [`nas::SupernetModel`] partitions the trainable parameters into the
//! architecture group (preference vectors) and the weight group, computes
//! both groups' gradients in one backward pass and hands each group to its
//! own optimizer.
//!
//! ## Modules
//!
//! - [`autograd`]: tape-based reverse-mode differentiation over [`Tensor`]
//! - [`nn`]: layers, parameters and the parameter registry
//! - [`nas`]: mixture layers, the supernet, temperature annealing, genotypes
//! - [`optim`]: SGD and Adam
//! - [`train`]: batches, losses, metrics, callbacks, synthetic data
//! - [`config`]: YAML search specs
//! - [`cli`]: command handlers for the `gumbel-nas` binary

pub mod autograd;
pub mod cli;
pub mod config;
pub mod error;
pub mod nas;
pub mod nn;
pub mod optim;
pub mod train;

pub use autograd::Tensor;
pub use error::{NasError, Result};
