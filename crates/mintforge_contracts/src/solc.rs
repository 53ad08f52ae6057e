//! Driver for the external `solc` binary over its standard-JSON interface.

use std::process::Stdio;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{info, warn};

use crate::templates::{self, ContractKind};
use crate::validate::{NftParams, TokenParams, ValidationError};

/// Compiler failures, including Solidity diagnostics.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("failed to run solc: {0}")]
    Solc(#[from] std::io::Error),

    #[error("solc exited with {status}: {stderr}")]
    SolcFailed { status: String, stderr: String },

    #[error("solc produced invalid output: {0}")]
    InvalidOutput(String),

    #[error("compilation failed:\n{0}")]
    Solidity(String),

    #[error("contract {0} not found in compilation output")]
    MissingContract(String),

    #[error("no bytecode generated for {0}")]
    EmptyBytecode(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// A compiled template ready for deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompiledContract {
    pub contract_name: String,
    /// `0x…` creation bytecode, constructor arguments not yet appended.
    pub bytecode: String,
    pub abi: Value,
    pub source_code: String,
    pub warnings: Vec<String>,
}

/// Compiles the generated templates through `solc --standard-json`.
#[derive(Debug, Clone)]
pub struct Compiler {
    solc_path: String,
}

impl Compiler {
    pub fn new(solc_path: impl Into<String>) -> Self {
        Self {
            solc_path: solc_path.into(),
        }
    }

    /// Validate token parameters, generate the source, and compile it.
    pub async fn compile_token(&self, params: TokenParams) -> Result<CompiledContract, CompileError> {
        let params = params.validated()?;
        let source = templates::erc20_contract_source(&params.name, &params.symbol);
        let name = templates::contract_name(ContractKind::Token, &params.symbol);
        self.compile(ContractKind::Token, &name, &source).await
    }

    /// Validate collection parameters, generate the source, and compile it.
    pub async fn compile_nft(&self, params: NftParams) -> Result<CompiledContract, CompileError> {
        let params = params.validated()?;
        let source = templates::erc721_contract_source(&params.name, &params.symbol);
        let name = templates::contract_name(ContractKind::Nft, &params.symbol);
        self.compile(ContractKind::Nft, &name, &source).await
    }

    async fn compile(
        &self,
        kind: ContractKind,
        contract_name: &str,
        source: &str,
    ) -> Result<CompiledContract, CompileError> {
        info!(contract = contract_name, kind = ?kind, "compiling template");

        let input = standard_json_input(source, &templates::dependency_sources(kind));
        let output = self.run_solc(&input).await?;
        let (bytecode, abi, warnings) = extract_contract(&output, contract_name)?;

        info!(
            contract = contract_name,
            bytecode_chars = bytecode.len(),
            warnings = warnings.len(),
            "template compiled"
        );

        Ok(CompiledContract {
            contract_name: contract_name.to_string(),
            bytecode,
            abi,
            source_code: source.to_string(),
            warnings,
        })
    }

    async fn run_solc(&self, input: &Value) -> Result<Value, CompileError> {
        let mut child = Command::new(&self.solc_path)
            .arg("--standard-json")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(input.to_string().as_bytes()).await?;
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(CompileError::SolcFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|e| CompileError::InvalidOutput(e.to_string()))
    }
}

/// Build the solc standard-JSON input: the generated contract as `main.sol`
/// plus the embedded dependency sources, optimizer at 200 runs.
pub fn standard_json_input(source: &str, dependencies: &[(&str, &str)]) -> Value {
    let mut sources = serde_json::Map::new();
    sources.insert("main.sol".into(), json!({ "content": source }));
    for (path, content) in dependencies {
        sources.insert((*path).into(), json!({ "content": content }));
    }

    json!({
        "language": "Solidity",
        "sources": sources,
        "settings": {
            "outputSelection": {
                "*": { "*": ["abi", "evm.bytecode"] }
            },
            "optimizer": {
                "enabled": true,
                "runs": 200
            }
        }
    })
}

/// Pull a contract's bytecode, ABI, and warning list out of solc output.
/// Error-severity diagnostics abort with their formatted messages joined.
fn extract_contract(
    output: &Value,
    contract_name: &str,
) -> Result<(String, Value, Vec<String>), CompileError> {
    let mut warnings = Vec::new();
    if let Some(diagnostics) = output.get("errors").and_then(Value::as_array) {
        let mut errors = Vec::new();
        for diagnostic in diagnostics {
            let severity = diagnostic.get("severity").and_then(Value::as_str);
            let message = diagnostic
                .get("formattedMessage")
                .or_else(|| diagnostic.get("message"))
                .and_then(Value::as_str)
                .unwrap_or("unknown diagnostic")
                .to_string();
            match severity {
                Some("error") => errors.push(message),
                Some("warning") => warnings.push(message),
                _ => {}
            }
        }
        if !errors.is_empty() {
            warn!(count = errors.len(), "solc reported errors");
            return Err(CompileError::Solidity(errors.join("\n\n")));
        }
    }

    let contract = output
        .get("contracts")
        .and_then(|c| c.get("main.sol"))
        .and_then(|c| c.get(contract_name))
        .ok_or_else(|| CompileError::MissingContract(contract_name.to_string()))?;

    let bytecode = contract
        .get("evm")
        .and_then(|e| e.get("bytecode"))
        .and_then(|b| b.get("object"))
        .and_then(Value::as_str)
        .unwrap_or("");
    if bytecode.is_empty() {
        return Err(CompileError::EmptyBytecode(contract_name.to_string()));
    }

    let abi = contract
        .get("abi")
        .cloned()
        .ok_or_else(|| CompileError::InvalidOutput("contract has no abi".into()))?;

    Ok((format!("0x{bytecode}"), abi, warnings))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_json_carries_all_sources() {
        let deps = templates::erc20_dependency_sources();
        let input = standard_json_input("contract A {}", &deps);

        assert_eq!(input["language"], "Solidity");
        assert_eq!(input["sources"]["main.sol"]["content"], "contract A {}");
        assert!(
            input["sources"]["@openzeppelin/contracts/token/ERC20/ERC20.sol"]["content"]
                .is_string()
        );
        assert_eq!(input["settings"]["optimizer"]["enabled"], true);
        assert_eq!(input["settings"]["optimizer"]["runs"], 200);
    }

    #[test]
    fn extract_contract_happy_path() {
        let output = json!({
            "contracts": {
                "main.sol": {
                    "MTKToken": {
                        "abi": [{"type": "constructor"}],
                        "evm": { "bytecode": { "object": "6080604052" } }
                    }
                }
            }
        });

        let (bytecode, abi, warnings) = extract_contract(&output, "MTKToken").unwrap();
        assert_eq!(bytecode, "0x6080604052");
        assert_eq!(abi[0]["type"], "constructor");
        assert!(warnings.is_empty());
    }

    #[test]
    fn extract_contract_collects_warnings() {
        let output = json!({
            "errors": [
                { "severity": "warning", "formattedMessage": "Warning: unused variable" }
            ],
            "contracts": {
                "main.sol": {
                    "MTKToken": {
                        "abi": [],
                        "evm": { "bytecode": { "object": "6080" } }
                    }
                }
            }
        });

        let (_, _, warnings) = extract_contract(&output, "MTKToken").unwrap();
        assert_eq!(warnings, vec!["Warning: unused variable"]);
    }

    #[test]
    fn extract_contract_aborts_on_errors() {
        let output = json!({
            "errors": [
                { "severity": "error", "formattedMessage": "ParserError: expected ';'" },
                { "severity": "error", "message": "second problem" }
            ]
        });

        let err = extract_contract(&output, "MTKToken").unwrap_err();
        match err {
            CompileError::Solidity(message) => {
                assert!(message.contains("ParserError"));
                assert!(message.contains("second problem"));
            }
            other => panic!("expected Solidity error, got {other:?}"),
        }
    }

    #[test]
    fn extract_contract_missing_contract() {
        let output = json!({ "contracts": { "main.sol": {} } });
        assert!(matches!(
            extract_contract(&output, "MTKToken").unwrap_err(),
            CompileError::MissingContract(_)
        ));
    }

    #[test]
    fn extract_contract_empty_bytecode() {
        let output = json!({
            "contracts": {
                "main.sol": {
                    "MTKToken": { "abi": [], "evm": { "bytecode": { "object": "" } } }
                }
            }
        });
        assert!(matches!(
            extract_contract(&output, "MTKToken").unwrap_err(),
            CompileError::EmptyBytecode(_)
        ));
    }

    #[tokio::test]
    async fn compile_rejects_invalid_params_before_running_solc() {
        // The binary path is bogus; validation must fail first.
        let compiler = Compiler::new("/nonexistent/solc");
        let result = compiler
            .compile_token(TokenParams {
                name: "".into(),
                symbol: "MTK".into(),
                initial_supply: "1000".into(),
            })
            .await;
        assert!(matches!(result.unwrap_err(), CompileError::Validation(_)));
    }
}
