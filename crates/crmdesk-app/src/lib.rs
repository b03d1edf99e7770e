// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod forms;
pub mod ids;
pub mod linked;
pub mod model;
pub mod notify;
pub mod selector;
pub mod sort;
pub mod table;

pub use forms::*;
pub use ids::*;
pub use linked::*;
pub use model::*;
pub use notify::*;
pub use selector::*;
pub use sort::*;
pub use table::*;
