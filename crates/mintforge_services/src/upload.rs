//! The collection upload workflow: image, shared token metadata, then
//! marketplace collection metadata.

use serde_json::json;
use tracing::{info, warn};

use crate::pinning::{PinError, PinningClient};
use crate::types::{UploadRequest, UploadResponse};

/// Decode the request's hex-encoded image payload.
fn decode_content(content_hex: &str) -> Result<Vec<u8>, PinError> {
    let stripped = content_hex.strip_prefix("0x").unwrap_or(content_hex);
    hex::decode(stripped).map_err(|e| PinError::InvalidResponse(format!("invalid content_hex: {e}")))
}

/// Upload a collection's assets to the pinning provider.
///
/// Three documents are pinned in sequence: the image, the shared per-token
/// metadata (its CID becomes the contract's base URI), and the marketplace
/// collection metadata. Only the first two are required; a collection
/// metadata failure degrades to `None`.
pub async fn upload_collection(
    pinning: &PinningClient,
    request: UploadRequest,
) -> Result<UploadResponse, PinError> {
    let image_bytes = decode_content(&request.content_hex)?;
    info!(
        collection = %request.name,
        symbol = %request.symbol,
        file = %request.file_name,
        size = image_bytes.len(),
        "starting collection upload"
    );

    // Step 1: the collection image.
    let image_cid = pinning
        .pin_file(
            image_bytes,
            &request.file_name,
            &request.content_type,
            &format!("{}-collection-image", request.symbol),
        )
        .await?;
    let image_url = format!("ipfs://{image_cid}");

    // Step 2: the shared token metadata. Every token resolves to this one
    // document; `{{id}}` is substituted by marketplaces, not by us.
    let description = request
        .description
        .clone()
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| format!("NFT from {} collection", request.name));
    let token_metadata = json!({
        "name": format!("{} #{{{{id}}}}", request.name),
        "description": description,
        "image": image_url,
        "attributes": [
            { "trait_type": "Collection", "value": request.name }
        ]
    });
    let metadata_cid = pinning
        .pin_json(
            &token_metadata,
            "metadata.json",
            &format!("{}-base-metadata", request.symbol),
        )
        .await?;
    let base_uri = format!("ipfs://{metadata_cid}");

    // Step 3: marketplace collection metadata. Best effort.
    let collection_metadata = json!({
        "name": request.name,
        "description": description,
        "image": image_url,
        "external_link": "",
        "seller_fee_basis_points": 0,
        "fee_recipient": ""
    });
    let collection_cid = match pinning
        .pin_json(
            &collection_metadata,
            "collection.json",
            &format!("{}-collection-metadata", request.symbol),
        )
        .await
    {
        Ok(cid) => Some(cid),
        Err(e) => {
            warn!(error = %e, "collection metadata upload failed, continuing");
            None
        }
    };

    info!(
        image_cid = %image_cid,
        metadata_cid = %metadata_cid,
        base_uri = %base_uri,
        "collection upload complete"
    );

    Ok(UploadResponse {
        success: true,
        image_gateway: pinning.gateway_url_for(&image_cid),
        metadata_gateway: pinning.gateway_url_for(&metadata_cid),
        collection_gateway: collection_cid
            .as_deref()
            .map(|cid| pinning.gateway_url_for(cid)),
        image_cid,
        image_url,
        base_uri,
        metadata_cid,
        collection_cid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_content_accepts_both_prefix_styles() {
        assert_eq!(decode_content("0x0102").unwrap(), vec![1, 2]);
        assert_eq!(decode_content("0102").unwrap(), vec![1, 2]);
    }

    #[test]
    fn decode_content_rejects_garbage() {
        assert!(decode_content("0xzz").is_err());
    }

    #[tokio::test]
    async fn upload_without_credentials_fails() {
        let pinning =
            PinningClient::new("https://api.example.com", "https://gw.example.com", vec![])
                .unwrap();
        let request = UploadRequest {
            file_name: "art.png".into(),
            content_type: "image/png".into(),
            content_hex: "0x89504e47".into(),
            name: "Art".into(),
            symbol: "ART".into(),
            description: None,
        };
        let err = upload_collection(&pinning, request).await.unwrap_err();
        assert!(matches!(err, PinError::NoCredentials));
    }
}
