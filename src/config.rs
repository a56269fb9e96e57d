// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fs::read_to_string;
use std::io::Read;
use std::io::stdin;
use std::path::Path;

use fsrs_core::error::ErrorKind;
use fsrs_core::error::Fallible;
use fsrs_core::error::fail;
use fsrs_core::params::ParameterConfig;
use fsrs_core::params::Parameters;
use serde::de::DeserializeOwned;

/// Loads scheduler parameters from a TOML file, or the defaults if no path
/// is given.
pub fn load_parameters(path: Option<&str>) -> Fallible<Parameters> {
    let Some(path) = path else {
        return Ok(Parameters::default());
    };
    if !Path::new(path).exists() {
        return fail(
            ErrorKind::Config,
            format!("config file '{path}' does not exist."),
        );
    }
    log::debug!("Loading parameters from {path}.");
    let text = read_to_string(path)?;
    let config = ParameterConfig::from_toml_str(&text)?;
    Parameters::from_config(config)
}

/// Reads a file, or standard input if the path is `-`.
pub fn read_input(path: &str) -> Fallible<String> {
    if path == "-" {
        let mut text = String::new();
        stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        Ok(read_to_string(path)?)
    }
}

pub fn read_json<T: DeserializeOwned>(path: &str) -> Fallible<T> {
    let text = read_input(path)?;
    Ok(serde_json::from_str(&text)?)
}
