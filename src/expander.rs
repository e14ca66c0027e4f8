//! Document expansion
//!
//! Drives the pipeline for a whole document:
//!
//! ```text
//! document ─► scanner ─► MacroBlock ─► parser ─► Expr* ─► evaluator ─► markup
//!                 │                                                      │
//!                 └── plain lines ──────────────────────────────► spliced output
//! ```
//!
//! One [`Environment`] lives for the whole run, so a `define` in an early
//! block is visible to every later block.

use tracing::{debug, info};

use crate::config::ExpanderConfig;
use crate::environment::{Environment, Frame};
use crate::errors::{BlockError, ExpandError};
use crate::evaluator::Evaluator;
use crate::parser::parse_block;
use crate::scanner::{MacroBlock, Scanner, Segment};

/// Expand the source of one block.
///
/// Every top-level expression is evaluated with an empty local frame and
/// positioned at `level`. Non-empty results are joined with `\n`.
pub fn expand_block(
    env: &mut Environment,
    source: &str,
    level: usize,
    base_indentation: usize,
    indent_width: usize,
) -> Result<String, BlockError> {
    Ok(expand_fragments(env, source, level, base_indentation, indent_width)?.join("\n"))
}

fn expand_fragments(
    env: &mut Environment,
    source: &str,
    level: usize,
    base_indentation: usize,
    indent_width: usize,
) -> Result<Vec<String>, BlockError> {
    let exprs = parse_block(source)?;
    let mut evaluator = Evaluator::new(env, base_indentation).with_indent(indent_width);

    let mut fragments = Vec::new();
    for expr in &exprs {
        let text = evaluator.render(expr, level, &Frame::new())?;
        if !text.is_empty() {
            fragments.push(text);
        }
    }
    Ok(fragments)
}

pub struct Expander {
    config: ExpanderConfig,
    env: Environment,
}

impl Expander {
    pub fn new(config: ExpanderConfig) -> Self {
        Self {
            config,
            env: Environment::new(),
        }
    }

    pub fn config(&self) -> &ExpanderConfig {
        &self.config
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// Output lines for one block, positioned at the annotation's column
    pub fn expand_macro_block(&mut self, block: &MacroBlock) -> Result<Vec<String>, BlockError> {
        let (level, base) = block.layout(self.config.indent_width);
        debug!(
            line = block.start_line,
            level, base, "expanding macro block"
        );

        let fragments = expand_fragments(
            &mut self.env,
            &block.source,
            level,
            base,
            self.config.indent_width,
        )?;

        Ok(fragments
            .iter()
            .flat_map(|fragment| fragment.split('\n'))
            .map(str::to_string)
            .collect())
    }

    /// Expand every macro block of `document` in order.
    ///
    /// Nothing is returned on error, so a failing run never produces a
    /// partially expanded document.
    pub fn expand_document(&mut self, document: &str) -> Result<String, ExpandError> {
        let segments = Scanner::new(&self.config).scan(document)?;

        let mut out: Vec<String> = Vec::with_capacity(segments.len());
        let mut block_count = 0;
        for segment in segments {
            match segment {
                Segment::Line(line) => out.push(line.to_string()),
                Segment::Block(block) => {
                    let expanded =
                        self.expand_macro_block(&block)
                            .map_err(|source| ExpandError::Block {
                                line: block.start_line,
                                source,
                            })?;
                    if self.config.keep_annotations {
                        out.extend(block.lines);
                    }
                    out.extend(expanded);
                    block_count += 1;
                }
            }
        }

        info!(
            blocks = block_count,
            definitions = self.env.len(),
            "expanded document"
        );

        let mut result = out.join("\n");
        if document.ends_with('\n') && !out.is_empty() {
            result.push('\n');
        }
        Ok(result)
    }
}

impl Default for Expander {
    fn default() -> Self {
        Self::new(ExpanderConfig::default())
    }
}
