// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Integer raised by the `int` payload (42)
pub const DEFAULT_INTEGER_PAYLOAD: i64 = 42;
/// Text raised by the `string` payload
pub const DEFAULT_TEXT_PAYLOAD: &str = "a string";
/// Message of the error raised by the `err` payload
pub const DEFAULT_ERROR_PAYLOAD: &str = "an error";
/// Type name of the `struct` payload
pub const STRUCT_PAYLOAD_TYPE: &str = "panicStruct";

/// Raised by `f2`'s cleanup when re-raising is requested
pub const REPLACEMENT_PAYLOAD: &str = "2nd panic";
/// Error written by the `seterr` recovery
pub const RECOVERED_ERROR_MESSAGE: &str = "panic recovered";

/// What the starting function's body returns when nothing is raised
pub const BODY_RESULT_NUMBER: i64 = 9;
pub const BODY_RESULT_TEXT: &str = "no panic";

/// Name of the line running the scenario's call chain
pub const MAIN_LINE: &str = "main";
/// Upper bound on sleeper lines per scenario
pub const MAX_BACKGROUND_LINES: usize = 16;
