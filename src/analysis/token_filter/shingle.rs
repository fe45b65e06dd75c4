//! Word n-gram ("shingle") filter.
//!
//! Emits every n-gram of consecutive tokens for `n` in `[min_size, max_size]`,
//! joined with a single space. For `(1, 2)` the stream `a b c` becomes
//! `a b c "a b" "b c"`: all unigrams in order, then all bigrams in order.

use crate::analysis::token::{Token, TokenStream};
use crate::analysis::token_filter::Filter;
use crate::error::{CofibotError, Result};

#[derive(Clone, Debug)]
pub struct ShingleFilter {
    min_size: usize,
    max_size: usize,
}

impl ShingleFilter {
    pub fn new(min_size: usize, max_size: usize) -> Result<Self> {
        if min_size == 0 || max_size < min_size {
            return Err(CofibotError::invalid_config(format!(
                "invalid shingle range ({min_size}, {max_size})"
            )));
        }
        Ok(ShingleFilter { min_size, max_size })
    }

    pub fn min_size(&self) -> usize {
        self.min_size
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }
}

impl Filter for ShingleFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let base: Vec<Token> = tokens.collect();
        let mut output = Vec::new();

        for size in self.min_size..=self.max_size {
            if size > base.len() {
                break;
            }
            for (position, window) in base.windows(size).enumerate() {
                let text = window
                    .iter()
                    .map(|t| t.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" ");
                output.push(Token::with_offsets(
                    text,
                    position,
                    window[0].start_offset,
                    window[size - 1].end_offset,
                ));
            }
        }

        Ok(Box::new(output.into_iter()))
    }

    fn name(&self) -> &'static str {
        "shingle"
    }
}
