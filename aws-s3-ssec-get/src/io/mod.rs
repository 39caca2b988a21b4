/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

/// Output destinations that accept writes at arbitrary offsets
pub mod sink;

// re-exports
pub use self::sink::FileSink;
pub use self::sink::OutputSink;
pub use self::sink::OutputTarget;
pub use self::sink::StdoutSink;
pub use self::sink::WriteAt;
