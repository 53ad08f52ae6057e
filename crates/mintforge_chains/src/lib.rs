pub mod registry;
pub mod selection;

pub use registry::{
    AddChainParameters, Chain, ChainSpec, FeeToken, NativeCurrency, add_chain_parameters,
    find_by_chain_id, find_by_short_name, is_supported, mainnets, registry, spec, testnets,
};
pub use selection::{RpcSelection, validate_url};
