//! Signature cipher deciphering for video platform.
//!
//! Cipher-protected streams carry `s` (scrambled signature), `sp` (query
//! parameter name) and `url` instead of a direct URL. The unscrambling
//! algorithm lives in the deployment's `base.js`: a decoder function shaped
//! `function(a){a=a.split("");H.x(a,1);...;return a.join("")}` delegating to a
//! helper object `var H={...}`. Both fragments are located by anchor patterns,
//! isolated with a balanced scanner and compiled by [`crate::platform::jsops`].

use crate::error::InfoError;
use crate::platform::client::PageFetcher;
use crate::platform::jsops::SignatureProgram;
use crate::utils::scan::balanced_block;
use regex::Regex;
use tracing::{debug, info};
use url::form_urlencoded;

/// Query parameter used when the payload omits `sp`
const DEFAULT_SIGNATURE_PARAM: &str = "signature";

/// Decoder bound to one player script deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoder {
    script_path: String,
    program: SignatureProgram,
}

impl Decoder {
    /// Create a decoder from a compiled program
    pub fn new(script_path: &str, program: SignatureProgram) -> Self {
        Self {
            script_path: script_path.to_string(),
            program,
        }
    }

    /// Compile a decoder from player script content.
    ///
    /// Every split/join function is a candidate; the first one whose helper
    /// object resolves and whose body compiles wins.
    pub fn from_script(script_path: &str, player_js: &str) -> Result<Self, InfoError> {
        let mut last_error = InfoError::PatternNotFound("decoder function");
        for function in decoder_candidates(player_js) {
            match compile_candidate(player_js, function) {
                Ok(program) => return Ok(Self::new(script_path, program)),
                Err(e) => {
                    debug!("Skipping decoder candidate: {}", e);
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }

    /// Script path this decoder was built from
    pub fn script_path(&self) -> &str {
        &self.script_path
    }

    /// Unscramble a raw signature
    pub fn decipher(&self, signature: &str) -> String {
        self.program.run(signature)
    }

    /// Resolve a `signatureCipher` payload into a playable URL
    pub fn resolve(&self, signature_cipher: &str) -> Result<String, InfoError> {
        let mut signature = None;
        let mut param = None;
        let mut base_url = None;

        for (key, value) in form_urlencoded::parse(signature_cipher.as_bytes()) {
            match key.as_ref() {
                "s" => signature = Some(value.into_owned()),
                "sp" => param = Some(value.into_owned()),
                "url" => base_url = Some(value.into_owned()),
                _ => {}
            }
        }

        let signature = signature
            .ok_or_else(|| InfoError::CipherError("payload has no signature".to_string()))?;
        let base_url =
            base_url.ok_or_else(|| InfoError::CipherError("payload has no url".to_string()))?;
        let param = param.unwrap_or_else(|| DEFAULT_SIGNATURE_PARAM.to_string());

        let deciphered = self.decipher(&signature);
        let encoded: String = form_urlencoded::byte_serialize(deciphered.as_bytes()).collect();
        let separator = if base_url.contains('?') { '&' } else { '?' };

        Ok(format!("{}{}{}={}", base_url, separator, param, encoded))
    }
}

/// Locate the version-pinned player script path in a watch page
pub fn find_player_script_path(html: &str) -> Result<&str, InfoError> {
    let regex = Regex::new(r"/s/player/[A-Za-z0-9]+/[A-Za-z0-9_.]+/[A-Za-z0-9_]+/base\.js")?;
    regex
        .find(html)
        .map(|m| m.as_str())
        .ok_or(InfoError::PatternNotFound("player script path"))
}

/// Functions enclosing a `.split("")` tried per split site
const MAX_ENCLOSING_LOOKBACK: usize = 8;

/// Locate the decoder function literal: the first function that splits a
/// string into characters, hands it to a helper object and joins it back.
pub fn find_decoder_function(player_js: &str) -> Result<&str, InfoError> {
    decoder_candidates(player_js)
        .find(|function| find_helper_name(function).is_ok())
        .ok_or(InfoError::PatternNotFound("decoder function"))
}

/// Innermost function around each `.split("")` that also joins, in script order
fn decoder_candidates(player_js: &str) -> impl Iterator<Item = &str> {
    let mut last_start = None;
    player_js
        .match_indices(r#".split("")"#)
        .filter_map(move |(split_at, _)| enclosing_function(player_js, split_at))
        .filter(|(_, function)| function.contains(r#".join("")"#))
        .filter_map(move |(start, function)| {
            if last_start == Some(start) {
                return None;
            }
            last_start = Some(start);
            Some(function)
        })
}

/// Nearest `function` literal whose extent covers `at`
fn enclosing_function(js: &str, at: usize) -> Option<(usize, &str)> {
    js[..at]
        .rmatch_indices("function")
        .take(MAX_ENCLOSING_LOOKBACK)
        .find_map(|(start, _)| {
            let function = function_at(js, start)?;
            (start + function.len() > at).then_some((start, function))
        })
}

fn compile_candidate(player_js: &str, function: &str) -> Result<SignatureProgram, InfoError> {
    let helper_name = find_helper_name(function)?;
    let helper = find_helper_object(player_js, helper_name)?;
    debug!(
        "Decoder candidate {} bytes, helper {} {} bytes",
        function.len(),
        helper_name,
        helper.len()
    );
    SignatureProgram::compile(function, helper_name, helper)
}

/// Isolate `function [name](params){body}` starting at `start`
fn function_at(js: &str, start: usize) -> Option<&str> {
    let after_keyword = start + "function".len();
    let paren = after_keyword + js[after_keyword..].find('(')?;

    let name = js[after_keyword..paren].trim();
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
    {
        return None;
    }

    let params = balanced_block(js, paren)?;
    let after_params = paren + params.len();
    let rest = &js[after_params..];
    let body_start = after_params + (rest.len() - rest.trim_start().len());
    let body = balanced_block(js, body_start)?;

    Some(&js[start..body_start + body.len()])
}

/// Extract the helper object name from `.split("");NAME.`
pub fn find_helper_name(function: &str) -> Result<&str, InfoError> {
    let regex = Regex::new(r#"\.split\(""\);([a-zA-Z0-9_$]+)\."#)?;
    regex
        .captures(function)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .ok_or(InfoError::PatternNotFound("helper object name"))
}

/// Isolate the literal of `var NAME={...}` in the player script
pub fn find_helper_object<'a>(player_js: &'a str, name: &str) -> Result<&'a str, InfoError> {
    let regex = Regex::new(&format!(
        r"(?:var|let|const)\s+{}\s*=\s*\{{",
        regex::escape(name)
    ))?;
    let declaration = regex
        .find(player_js)
        .ok_or(InfoError::PatternNotFound("helper object declaration"))?;

    balanced_block(player_js, declaration.end() - 1)
        .ok_or(InfoError::PatternNotFound("helper object body"))
}

/// Builds a fresh decoder per request from the page's player script
pub struct CipherDecoderBuilder<'a> {
    pages: &'a PageFetcher<'a>,
}

impl<'a> CipherDecoderBuilder<'a> {
    /// Create a builder fetching scripts through `pages`
    pub fn new(pages: &'a PageFetcher<'a>) -> Self {
        Self { pages }
    }

    /// Locate, fetch and compile the decoder referenced by a watch page
    pub async fn build(&self, html: &str) -> Result<Decoder, InfoError> {
        let path = find_player_script_path(html)?;
        info!("Building signature decoder from {}", path);

        let player_js = self.pages.script(path).await?;
        debug!("Fetched player script: {} bytes", player_js.len());

        Decoder::from_script(path, &player_js)
    }
}
