// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Writer/reader schema reconciliation.
//!
//! [`resolve`] walks a writer and a reader schema together and produces an
//! immutable [`ReadPlan`]: for every reachable position, how to consume the
//! writer's bytes and produce a value shaped like the reader's schema.
//! [`PlanCache`] amortizes plan construction across repeated decodes of the
//! same schema pair.

pub mod cache;
pub mod plan;
mod resolve;

pub use cache::PlanCache;
pub use plan::{ReadPlan, RecordStep, UnionBranch};
pub use resolve::resolve;
