pub mod abi;
pub mod solc;
pub mod templates;
pub mod validate;

pub use abi::{compute_contract_address, deploy_data, encode_constructor_args, parse_supply};
pub use solc::{CompileError, CompiledContract, Compiler};
pub use templates::{ContractKind, contract_name, erc20_contract_source, erc721_contract_source};
pub use validate::{
    NftParams, TokenParams, ValidationError, validate_address, validate_creation_bytecode,
};
