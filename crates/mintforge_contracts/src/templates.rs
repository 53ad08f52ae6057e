//! Solidity source generation for the two deployable templates.
//!
//! The generated contract imports OpenZeppelin v5 primitives; the dependency
//! sources are embedded here so compilation never touches the network or a
//! node_modules-style package tree.

use serde::{Deserialize, Serialize};

/// Which template a deployment uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractKind {
    Token,
    Nft,
}

impl ContractKind {
    pub fn label(&self) -> &'static str {
        match self {
            ContractKind::Token => "ERC20 token",
            ContractKind::Nft => "ERC721 collection",
        }
    }
}

/// The compiled contract's name for a given symbol: `{SYMBOL}Token` or
/// `{SYMBOL}NFT`.
pub fn contract_name(kind: ContractKind, symbol: &str) -> String {
    match kind {
        ContractKind::Token => format!("{symbol}Token"),
        ContractKind::Nft => format!("{symbol}NFT"),
    }
}

/// Escape a user string for inclusion in a Solidity string literal.
fn solidity_escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Generate the ERC20 token contract source. The constructor mints the
/// initial supply (scaled by `decimals()`) to the deployer.
pub fn erc20_contract_source(name: &str, symbol: &str) -> String {
    let name = solidity_escape(name);
    format!(
        r#"// SPDX-License-Identifier: MIT
pragma solidity ^0.8.20;

import "@openzeppelin/contracts/token/ERC20/ERC20.sol";

contract {symbol}Token is ERC20 {{
    constructor(uint256 initialSupply) ERC20("{name}", "{symbol}") {{
        _mint(msg.sender, initialSupply * 10 ** decimals());
    }}

    function mint(address to, uint256 amount) public {{
        _mint(to, amount * 10 ** decimals());
    }}
}}"#
    )
}

/// Generate the ERC721 collection contract source. All tokens share a single
/// metadata document at the base URI; minting is sequential from token 1.
pub fn erc721_contract_source(name: &str, symbol: &str) -> String {
    let name = solidity_escape(name);
    format!(
        r#"// SPDX-License-Identifier: MIT
pragma solidity ^0.8.20;

import "@openzeppelin/contracts/token/ERC721/ERC721.sol";

contract {symbol}NFT is ERC721 {{
    uint256 public nextTokenId = 1;
    string private _baseTokenURI;

    constructor(string memory baseURI_) ERC721("{name}", "{symbol}") {{
        require(bytes(baseURI_).length > 0, "Base URI cannot be empty");
        _baseTokenURI = baseURI_;
    }}

    // Public mint function (anyone can mint)
    function mint(address to) public returns (uint256) {{
        uint256 tokenId = nextTokenId;
        nextTokenId++;
        _safeMint(to, tokenId);
        return tokenId;
    }}

    // Base URI getter (for transparency)
    function _baseURI() internal view override returns (string memory) {{
        return _baseTokenURI;
    }}

    // tokenURI override - returns baseURI directly (all tokens share same metadata)
    function tokenURI(uint256 tokenId) public view override returns (string memory) {{
        _requireOwned(tokenId); // Token existence check
        return _baseTokenURI; // All tokens use the same metadata
    }}
}}"#
    )
}

/// Embedded dependency sources for the ERC20 template, keyed by import path.
pub fn erc20_dependency_sources() -> Vec<(&'static str, &'static str)> {
    vec![
        ("@openzeppelin/contracts/token/ERC20/ERC20.sol", OZ_ERC20),
        ("@openzeppelin/contracts/token/ERC20/IERC20.sol", OZ_IERC20),
        (
            "@openzeppelin/contracts/token/ERC20/extensions/IERC20Metadata.sol",
            OZ_IERC20_METADATA,
        ),
        ("@openzeppelin/contracts/utils/Context.sol", OZ_CONTEXT),
        (
            "@openzeppelin/contracts/interfaces/draft-IERC6093.sol",
            OZ_ERC6093,
        ),
    ]
}

/// Embedded dependency sources for the ERC721 template, keyed by import path.
pub fn erc721_dependency_sources() -> Vec<(&'static str, &'static str)> {
    vec![
        ("@openzeppelin/contracts/token/ERC721/ERC721.sol", OZ_ERC721),
        ("@openzeppelin/contracts/token/ERC721/IERC721.sol", OZ_IERC721),
        (
            "@openzeppelin/contracts/token/ERC721/extensions/IERC721Metadata.sol",
            OZ_IERC721_METADATA,
        ),
        ("@openzeppelin/contracts/utils/Context.sol", OZ_CONTEXT),
        (
            "@openzeppelin/contracts/utils/introspection/IERC165.sol",
            OZ_IERC165,
        ),
        (
            "@openzeppelin/contracts/utils/introspection/ERC165.sol",
            OZ_ERC165,
        ),
        (
            "@openzeppelin/contracts/interfaces/draft-IERC6093.sol",
            OZ_ERC6093,
        ),
    ]
}

/// The dependency set for a template kind.
pub fn dependency_sources(kind: ContractKind) -> Vec<(&'static str, &'static str)> {
    match kind {
        ContractKind::Token => erc20_dependency_sources(),
        ContractKind::Nft => erc721_dependency_sources(),
    }
}

// ---------------------------------------------------------------------------
// OpenZeppelin v5.0.0 sources (trimmed to what the templates use)
// ---------------------------------------------------------------------------

const OZ_ERC20: &str = r#"
// SPDX-License-Identifier: MIT
pragma solidity ^0.8.20;

import {IERC20} from "./IERC20.sol";
import {IERC20Metadata} from "./extensions/IERC20Metadata.sol";
import {Context} from "../../utils/Context.sol";
import {IERC20Errors} from "../../interfaces/draft-IERC6093.sol";

abstract contract ERC20 is Context, IERC20, IERC20Metadata, IERC20Errors {
    mapping(address account => uint256) private _balances;
    mapping(address account => mapping(address spender => uint256)) private _allowances;
    uint256 private _totalSupply;
    string private _name;
    string private _symbol;

    constructor(string memory name_, string memory symbol_) {
        _name = name_;
        _symbol = symbol_;
    }

    function name() public view virtual returns (string memory) {
        return _name;
    }

    function symbol() public view virtual returns (string memory) {
        return _symbol;
    }

    function decimals() public view virtual returns (uint8) {
        return 18;
    }

    function totalSupply() public view virtual returns (uint256) {
        return _totalSupply;
    }

    function balanceOf(address account) public view virtual returns (uint256) {
        return _balances[account];
    }

    function transfer(address to, uint256 value) public virtual returns (bool) {
        address owner = _msgSender();
        _transfer(owner, to, value);
        return true;
    }

    function allowance(address owner, address spender) public view virtual returns (uint256) {
        return _allowances[owner][spender];
    }

    function approve(address spender, uint256 value) public virtual returns (bool) {
        address owner = _msgSender();
        _approve(owner, spender, value);
        return true;
    }

    function transferFrom(address from, address to, uint256 value) public virtual returns (bool) {
        address spender = _msgSender();
        _spendAllowance(from, spender, value);
        _transfer(from, to, value);
        return true;
    }

    function _transfer(address from, address to, uint256 value) internal {
        if (from == address(0)) {
            revert ERC20InvalidSender(address(0));
        }
        if (to == address(0)) {
            revert ERC20InvalidReceiver(address(0));
        }
        _update(from, to, value);
    }

    function _update(address from, address to, uint256 value) internal virtual {
        if (from == address(0)) {
            _totalSupply += value;
        } else {
            uint256 fromBalance = _balances[from];
            if (fromBalance < value) {
                revert ERC20InsufficientBalance(from, fromBalance, value);
            }
            unchecked {
                _balances[from] = fromBalance - value;
            }
        }

        if (to == address(0)) {
            unchecked {
                _totalSupply -= value;
            }
        } else {
            unchecked {
                _balances[to] += value;
            }
        }

        emit Transfer(from, to, value);
    }

    function _mint(address account, uint256 value) internal {
        if (account == address(0)) {
            revert ERC20InvalidReceiver(address(0));
        }
        _update(address(0), account, value);
    }

    function _burn(address account, uint256 value) internal {
        if (account == address(0)) {
            revert ERC20InvalidSender(address(0));
        }
        _update(account, address(0), value);
    }

    function _approve(address owner, address spender, uint256 value) internal {
        _approve(owner, spender, value, true);
    }

    function _approve(address owner, address spender, uint256 value, bool emitEvent) internal virtual {
        if (owner == address(0)) {
            revert ERC20InvalidApprover(address(0));
        }
        if (spender == address(0)) {
            revert ERC20InvalidSpender(address(0));
        }
        _allowances[owner][spender] = value;
        if (emitEvent) {
            emit Approval(owner, spender, value);
        }
    }

    function _spendAllowance(address owner, address spender, uint256 value) internal virtual {
        uint256 currentAllowance = allowance(owner, spender);
        if (currentAllowance != type(uint256).max) {
            if (currentAllowance < value) {
                revert ERC20InsufficientAllowance(spender, currentAllowance, value);
            }
            unchecked {
                _approve(owner, spender, currentAllowance - value, false);
            }
        }
    }
}
"#;

const OZ_IERC20: &str = r#"
// SPDX-License-Identifier: MIT
pragma solidity ^0.8.20;

interface IERC20 {
    event Transfer(address indexed from, address indexed to, uint256 value);
    event Approval(address indexed owner, address indexed spender, uint256 value);
    function totalSupply() external view returns (uint256);
    function balanceOf(address account) external view returns (uint256);
    function transfer(address to, uint256 value) external returns (bool);
    function allowance(address owner, address spender) external view returns (uint256);
    function approve(address spender, uint256 value) external returns (bool);
    function transferFrom(address from, address to, uint256 value) external returns (bool);
}
"#;

const OZ_IERC20_METADATA: &str = r#"
// SPDX-License-Identifier: MIT
pragma solidity ^0.8.20;

import {IERC20} from "../IERC20.sol";

interface IERC20Metadata is IERC20 {
    function name() external view returns (string memory);
    function symbol() external view returns (string memory);
    function decimals() external view returns (uint8);
}
"#;

const OZ_CONTEXT: &str = r#"
// SPDX-License-Identifier: MIT
pragma solidity ^0.8.20;

abstract contract Context {
    function _msgSender() internal view virtual returns (address) {
        return msg.sender;
    }

    function _msgData() internal view virtual returns (bytes calldata) {
        return msg.data;
    }

    function _contextSuffixLength() internal view virtual returns (uint256) {
        return 0;
    }
}
"#;

const OZ_ERC6093: &str = r#"
// SPDX-License-Identifier: MIT
pragma solidity ^0.8.20;

interface IERC20Errors {
    error ERC20InsufficientBalance(address sender, uint256 balance, uint256 needed);
    error ERC20InvalidSender(address sender);
    error ERC20InvalidReceiver(address receiver);
    error ERC20InsufficientAllowance(address spender, uint256 allowance, uint256 needed);
    error ERC20InvalidApprover(address approver);
    error ERC20InvalidSpender(address spender);
}

interface IERC721Errors {
    error ERC721InvalidOwner(address owner);
    error ERC721NonexistentToken(uint256 tokenId);
    error ERC721IncorrectOwner(address sender, uint256 tokenId, address owner);
    error ERC721InvalidSender(address sender);
    error ERC721InvalidReceiver(address receiver);
    error ERC721InsufficientApproval(address operator, uint256 tokenId);
    error ERC721InvalidApprover(address approver);
    error ERC721InvalidOperator(address operator);
}
"#;

const OZ_ERC721: &str = r#"
// SPDX-License-Identifier: MIT
pragma solidity ^0.8.20;

import {IERC721} from "./IERC721.sol";
import {IERC721Metadata} from "./extensions/IERC721Metadata.sol";
import {Context} from "../../utils/Context.sol";
import {IERC721Errors} from "../../interfaces/draft-IERC6093.sol";
import {IERC165, ERC165} from "../../utils/introspection/ERC165.sol";

abstract contract ERC721 is Context, ERC165, IERC721, IERC721Metadata, IERC721Errors {
    mapping(uint256 tokenId => address) private _owners;
    mapping(address owner => uint256) private _balances;
    mapping(uint256 tokenId => address) private _tokenApprovals;
    mapping(address owner => mapping(address operator => bool)) private _operatorApprovals;

    string private _name;
    string private _symbol;

    constructor(string memory name_, string memory symbol_) {
        _name = name_;
        _symbol = symbol_;
    }

    function supportsInterface(bytes4 interfaceId) public view virtual override(ERC165, IERC165) returns (bool) {
        return interfaceId == type(IERC721).interfaceId || interfaceId == type(IERC721Metadata).interfaceId || super.supportsInterface(interfaceId);
    }

    function balanceOf(address owner) public view virtual returns (uint256) {
        if (owner == address(0)) {
            revert ERC721InvalidOwner(address(0));
        }
        return _balances[owner];
    }

    function ownerOf(uint256 tokenId) public view virtual returns (address) {
        return _requireOwned(tokenId);
    }

    function name() public view virtual returns (string memory) {
        return _name;
    }

    function symbol() public view virtual returns (string memory) {
        return _symbol;
    }

    function tokenURI(uint256 tokenId) public view virtual returns (string memory) {
        _requireOwned(tokenId);
        string memory baseURI = _baseURI();
        return bytes(baseURI).length > 0 ? string.concat(baseURI, _toString(tokenId)) : "";
    }

    function _baseURI() internal view virtual returns (string memory) {
        return "";
    }

    function approve(address to, uint256 tokenId) public virtual {
        _approve(to, tokenId, _msgSender());
    }

    function getApproved(uint256 tokenId) public view virtual returns (address) {
        _requireOwned(tokenId);
        return _getApproved(tokenId);
    }

    function setApprovalForAll(address operator, bool approved) public virtual {
        _setApprovalForAll(_msgSender(), operator, approved);
    }

    function isApprovedForAll(address owner, address operator) public view virtual returns (bool) {
        return _operatorApprovals[owner][operator];
    }

    function transferFrom(address from, address to, uint256 tokenId) public virtual {
        if (to == address(0)) {
            revert ERC721InvalidReceiver(address(0));
        }
        address previousOwner = _update(to, tokenId, _msgSender());
        if (previousOwner != from) {
            revert ERC721IncorrectOwner(from, tokenId, previousOwner);
        }
    }

    function safeTransferFrom(address from, address to, uint256 tokenId) public {
        safeTransferFrom(from, to, tokenId, "");
    }

    function safeTransferFrom(address from, address to, uint256 tokenId, bytes memory data) public virtual {
        transferFrom(from, to, tokenId);
    }

    function _ownerOf(uint256 tokenId) internal view virtual returns (address) {
        return _owners[tokenId];
    }

    function _getApproved(uint256 tokenId) internal view virtual returns (address) {
        return _tokenApprovals[tokenId];
    }

    function _isAuthorized(address owner, address spender, uint256 tokenId) internal view virtual returns (bool) {
        return spender != address(0) && (owner == spender || isApprovedForAll(owner, spender) || _getApproved(tokenId) == spender);
    }

    function _checkAuthorized(address owner, address spender, uint256 tokenId) internal view virtual {
        if (!_isAuthorized(owner, spender, tokenId)) {
            if (owner == address(0)) {
                revert ERC721NonexistentToken(tokenId);
            } else {
                revert ERC721InsufficientApproval(spender, tokenId);
            }
        }
    }

    function _increaseBalance(address account, uint128 value) internal virtual {
        unchecked {
            _balances[account] += value;
        }
    }

    function _update(address to, uint256 tokenId, address auth) internal virtual returns (address) {
        address from = _ownerOf(tokenId);

        if (auth != address(0)) {
            _checkAuthorized(from, auth, tokenId);
        }

        if (from != address(0)) {
            _approve(address(0), tokenId, address(0), false);
            unchecked {
                _balances[from] -= 1;
            }
        }

        if (to != address(0)) {
            unchecked {
                _balances[to] += 1;
            }
        }

        _owners[tokenId] = to;
        emit Transfer(from, to, tokenId);
        return from;
    }

    function _mint(address to, uint256 tokenId) internal {
        if (to == address(0)) {
            revert ERC721InvalidReceiver(address(0));
        }
        address previousOwner = _update(to, tokenId, address(0));
        if (previousOwner != address(0)) {
            revert ERC721InvalidSender(address(0));
        }
    }

    function _safeMint(address to, uint256 tokenId) internal {
        _safeMint(to, tokenId, "");
    }

    function _safeMint(address to, uint256 tokenId, bytes memory data) internal virtual {
        _mint(to, tokenId);
    }

    function _burn(uint256 tokenId) internal {
        address previousOwner = _update(address(0), tokenId, address(0));
        if (previousOwner == address(0)) {
            revert ERC721NonexistentToken(tokenId);
        }
    }

    function _transfer(address from, address to, uint256 tokenId) internal {
        if (to == address(0)) {
            revert ERC721InvalidReceiver(address(0));
        }
        address previousOwner = _update(to, tokenId, address(0));
        if (previousOwner == address(0)) {
            revert ERC721NonexistentToken(tokenId);
        } else if (previousOwner != from) {
            revert ERC721IncorrectOwner(from, tokenId, previousOwner);
        }
    }

    function _approve(address to, uint256 tokenId, address auth) internal {
        _approve(to, tokenId, auth, true);
    }

    function _approve(address to, uint256 tokenId, address auth, bool emitEvent) internal virtual {
        if (emitEvent || auth != address(0)) {
            address owner = _requireOwned(tokenId);

            if (auth != address(0) && owner != auth && !isApprovedForAll(owner, auth)) {
                revert ERC721InvalidApprover(auth);
            }

            if (emitEvent) {
                emit Approval(owner, to, tokenId);
            }
        }

        _tokenApprovals[tokenId] = to;
    }

    function _setApprovalForAll(address owner, address operator, bool approved) internal virtual {
        if (operator == address(0)) {
            revert ERC721InvalidOperator(operator);
        }
        _operatorApprovals[owner][operator] = approved;
        emit ApprovalForAll(owner, operator, approved);
    }

    function _requireOwned(uint256 tokenId) internal view returns (address) {
        address owner = _ownerOf(tokenId);
        if (owner == address(0)) {
            revert ERC721NonexistentToken(tokenId);
        }
        return owner;
    }

    function _toString(uint256 value) internal pure returns (string memory) {
        if (value == 0) {
            return "0";
        }
        uint256 temp = value;
        uint256 digits;
        while (temp != 0) {
            digits++;
            temp /= 10;
        }
        bytes memory buffer = new bytes(digits);
        while (value != 0) {
            digits -= 1;
            buffer[digits] = bytes1(uint8(48 + uint256(value % 10)));
            value /= 10;
        }
        return string(buffer);
    }
}
"#;

const OZ_IERC721: &str = r#"
// SPDX-License-Identifier: MIT
pragma solidity ^0.8.20;

import {IERC165} from "../../utils/introspection/IERC165.sol";

interface IERC721 is IERC165 {
    event Transfer(address indexed from, address indexed to, uint256 indexed tokenId);
    event Approval(address indexed owner, address indexed approved, uint256 indexed tokenId);
    event ApprovalForAll(address indexed owner, address indexed operator, bool approved);
    function balanceOf(address owner) external view returns (uint256 balance);
    function ownerOf(uint256 tokenId) external view returns (address owner);
    function safeTransferFrom(address from, address to, uint256 tokenId, bytes calldata data) external;
    function safeTransferFrom(address from, address to, uint256 tokenId) external;
    function transferFrom(address from, address to, uint256 tokenId) external;
    function approve(address to, uint256 tokenId) external;
    function setApprovalForAll(address operator, bool approved) external;
    function getApproved(uint256 tokenId) external view returns (address operator);
    function isApprovedForAll(address owner, address operator) external view returns (bool);
}
"#;

const OZ_IERC721_METADATA: &str = r#"
// SPDX-License-Identifier: MIT
pragma solidity ^0.8.20;

import {IERC721} from "../IERC721.sol";

interface IERC721Metadata is IERC721 {
    function name() external view returns (string memory);
    function symbol() external view returns (string memory);
    function tokenURI(uint256 tokenId) external view returns (string memory);
}
"#;

const OZ_IERC165: &str = r#"
// SPDX-License-Identifier: MIT
pragma solidity ^0.8.20;

interface IERC165 {
    function supportsInterface(bytes4 interfaceId) external view returns (bool);
}
"#;

const OZ_ERC165: &str = r#"
// SPDX-License-Identifier: MIT
pragma solidity ^0.8.20;

import {IERC165} from "./IERC165.sol";

abstract contract ERC165 is IERC165 {
    function supportsInterface(bytes4 interfaceId) public view virtual returns (bool) {
        return interfaceId == type(IERC165).interfaceId;
    }
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn erc20_source_carries_name_symbol_and_mint() {
        let source = erc20_contract_source("My Token", "MTK");
        assert!(source.contains("contract MTKToken is ERC20"));
        assert!(source.contains(r#"ERC20("My Token", "MTK")"#));
        assert!(source.contains("_mint(msg.sender, initialSupply * 10 ** decimals())"));
    }

    #[test]
    fn erc721_source_requires_base_uri() {
        let source = erc721_contract_source("My Collection", "MNFT");
        assert!(source.contains("contract MNFTNFT is ERC721"));
        assert!(source.contains(r#"require(bytes(baseURI_).length > 0, "Base URI cannot be empty")"#));
        assert!(source.contains("uint256 public nextTokenId = 1"));
    }

    #[test]
    fn names_with_quotes_are_escaped() {
        let source = erc20_contract_source(r#"The "Best" Token"#, "BEST");
        assert!(source.contains(r#"ERC20("The \"Best\" Token", "BEST")"#));
    }

    #[test]
    fn contract_names_follow_symbol() {
        assert_eq!(contract_name(ContractKind::Token, "MTK"), "MTKToken");
        assert_eq!(contract_name(ContractKind::Nft, "MNFT"), "MNFTNFT");
    }

    #[test]
    fn dependency_sets_resolve_template_imports() {
        let erc20_paths: Vec<&str> = erc20_dependency_sources().iter().map(|(p, _)| *p).collect();
        assert!(erc20_paths.contains(&"@openzeppelin/contracts/token/ERC20/ERC20.sol"));
        assert_eq!(erc20_paths.len(), 5);

        let erc721_paths: Vec<&str> = erc721_dependency_sources().iter().map(|(p, _)| *p).collect();
        assert!(erc721_paths.contains(&"@openzeppelin/contracts/token/ERC721/ERC721.sol"));
        assert!(erc721_paths.contains(&"@openzeppelin/contracts/utils/introspection/ERC165.sol"));
        assert_eq!(erc721_paths.len(), 7);
    }

    #[test]
    fn dependency_sources_are_pragma_consistent() {
        for (_, source) in erc20_dependency_sources()
            .into_iter()
            .chain(erc721_dependency_sources())
        {
            assert!(source.contains("pragma solidity ^0.8.20;"));
        }
    }
}
