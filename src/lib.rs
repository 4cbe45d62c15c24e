//! # Transcript Insights
//!
//! Transcript analysis with pluggable local and hosted backends.
//!
//! Transcript Insights parses subtitle files into timestamped segments,
//! splits them into boundary-respecting retrieval chunks, selects the
//! chunks most relevant to a query, and runs analysis operations
//! (summaries, mind maps, keywords, sentiment, question answering,
//! structured templates) through a local heuristics provider or hosted
//! LLM APIs, with TTL-bounded caching and portable export formats.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────┐   ┌─────────────┐
//! │  Subtitles  │──▶│  Normalize    │──▶│   Chunking   │
//! │  SRT/VTT    │   │ + Detect lang │   │ + Relevance  │
//! └─────────────┘   └──────────────┘   └──────┬──────┘
//!                                             │
//!                        ┌────────────────────┤
//!                        ▼                    ▼
//!                  ┌───────────┐       ┌───────────┐
//!                  │ Providers │       │  Export    │
//!                  │ local/LLM │       │ md/csv/pdf │
//!                  └─────┬─────┘       └───────────┘
//!                        ▼
//!                  ┌───────────┐
//!                  │ TTL cache │
//!                  └───────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! tix detect talk.srt                      # language detection
//! tix chunks talk.srt --chunk-size 800     # retrieval chunks
//! tix analyze summary talk.srt             # local heuristics backend
//! tix analyze summary talk.srt --runtime openai
//! tix ask talk.srt "what was decided?"     # question answering
//! tix export talk.srt --format csv         # portable export
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`subtitles`] | SRT/VTT/plain-text parsing |
//! | [`segments`] | Segment normalization and transcript rendering |
//! | [`chunk`] | Boundary-respecting transcript chunking |
//! | [`relevance`] | Keyword-scored chunk selection |
//! | [`language`] | Language detection with reliability bands |
//! | [`provider`] | Analysis provider trait and registry |
//! | [`provider_local`] | Deterministic local heuristics backend |
//! | [`provider_remote`] | OpenAI/Gemini backends with retry |
//! | [`prompts`] | Prompt builders for remote backends |
//! | [`analyze`] | Orchestration with cache-through operations |
//! | [`store`] | TTL-bounded transcript and analysis stores |
//! | [`export`] | Markdown/CSV/PDF rendering and export tokens |

pub mod analyze;
pub mod chunk;
pub mod config;
pub mod export;
pub mod language;
pub mod models;
pub mod prompts;
pub mod provider;
pub mod provider_local;
pub mod provider_remote;
pub mod relevance;
pub mod segments;
pub mod store;
pub mod subtitles;
