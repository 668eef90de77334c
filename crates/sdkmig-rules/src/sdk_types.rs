//! Predicates over SDK type names and well-known v2 types

use crate::naming::{simple_name, split_fqn, V1_PREFIX, V2_PREFIX};

pub const V2_S3_MODEL: &str = "software.amazon.awssdk.services.s3.model";
pub const V2_TRANSFER_MODEL: &str = "software.amazon.awssdk.transfer.s3.model";

pub const S3_CLIENT: &str = "software.amazon.awssdk.services.s3.S3Client";
pub const S3_ASYNC_CLIENT: &str = "software.amazon.awssdk.services.s3.S3AsyncClient";
pub const S3_TRANSFER_MANAGER: &str = "software.amazon.awssdk.transfer.s3.S3TransferManager";
pub const PUT_OBJECT_REQUEST: &str = "software.amazon.awssdk.services.s3.model.PutObjectRequest";
pub const HEAD_OBJECT_RESPONSE: &str = "software.amazon.awssdk.services.s3.model.HeadObjectResponse";
pub const GET_OBJECT_RESPONSE: &str = "software.amazon.awssdk.services.s3.model.GetObjectResponse";
pub const REQUEST_PAYER: &str = "software.amazon.awssdk.services.s3.model.RequestPayer";
pub const REQUEST_BODY: &str = "software.amazon.awssdk.core.sync.RequestBody";
pub const ASYNC_REQUEST_BODY: &str = "software.amazon.awssdk.core.async.AsyncRequestBody";
pub const RESPONSE_INPUT_STREAM: &str = "software.amazon.awssdk.core.ResponseInputStream";
pub const RESPONSE_BYTES: &str = "software.amazon.awssdk.core.ResponseBytes";
pub const CLIENT_OVERRIDE_CONFIGURATION: &str =
    "software.amazon.awssdk.core.client.config.ClientOverrideConfiguration";
pub const APACHE_HTTP_CLIENT: &str = "software.amazon.awssdk.http.apache.ApacheHttpClient";
pub const NETTY_HTTP_CLIENT: &str = "software.amazon.awssdk.http.nio.netty.NettyNioAsyncHttpClient";
pub const DURATION: &str = "java.time.Duration";

pub const V1_S3_CLIENT: &str = "com.amazonaws.services.s3.AmazonS3";
pub const V1_SERVICE_EXCEPTION: &str = "com.amazonaws.AmazonServiceException";
pub const V1_CLIENT_BUILDER: &str = "com.amazonaws.client.builder.AwsClientBuilder";
pub const V1_S3_OBJECT: &str = "com.amazonaws.services.s3.model.S3Object";
pub const V1_S3_OBJECT_INPUT_STREAM: &str = "com.amazonaws.services.s3.model.S3ObjectInputStream";

pub fn is_v1_type(fqn: &str) -> bool {
    fqn.starts_with(V1_PREFIX)
}

pub fn is_v2_type(fqn: &str) -> bool {
    fqn.starts_with(V2_PREFIX)
}

/// Package of a fully qualified name (empty for simple names)
pub fn package_of(fqn: &str) -> &str {
    split_fqn(fqn).0
}

/// A v2 service model class (`software.amazon.awssdk.services.*.model.*`)
pub fn is_v2_model(fqn: &str) -> bool {
    let package = package_of(fqn);
    package.starts_with("software.amazon.awssdk.services.") && package.ends_with(".model")
}

/// A v2 service client interface (`S3Client`, `SqsAsyncClient`)
pub fn is_v2_client(fqn: &str) -> bool {
    let package = package_of(fqn);
    package.starts_with("software.amazon.awssdk.services.")
        && !package.ends_with(".model")
        && simple_name(fqn).ends_with("Client")
}

/// A v2 client builder (`S3ClientBuilder`, `SqsAsyncClientBuilder`)
pub fn is_v2_client_builder(fqn: &str) -> bool {
    let package = package_of(fqn);
    package.starts_with("software.amazon.awssdk.services.")
        && !package.ends_with(".model")
        && simple_name(fqn).ends_with("ClientBuilder")
}

/// A v2 async client builder
pub fn is_v2_async_builder(fqn: &str) -> bool {
    is_v2_client_builder(fqn) && simple_name(fqn).ends_with("AsyncClientBuilder")
}

/// A v1 client interface or class (`AmazonS3`, `AmazonSQSClient`)
pub fn is_v1_client(fqn: &str) -> bool {
    let package = package_of(fqn);
    if !package.starts_with("com.amazonaws.services.") || package.contains(".model") {
        return false;
    }
    let name = simple_name(fqn);
    (name.starts_with("Amazon") || name.starts_with("AWS")) && !name.ends_with("Exception")
}

/// A v1 client builder (`AmazonS3ClientBuilder`)
pub fn is_v1_client_builder(fqn: &str) -> bool {
    is_v1_client(fqn) && simple_name(fqn).ends_with("ClientBuilder")
}

/// The client a v2 builder builds (`S3ClientBuilder` → `S3Client`)
pub fn client_for_builder(builder_fqn: &str) -> Option<String> {
    builder_fqn.strip_suffix("Builder").map(str::to_string)
}

/// Known supertypes used for receiver matching
pub fn supertypes(fqn: &str) -> Vec<String> {
    let mut types = vec![fqn.to_string()];
    let name = simple_name(fqn);

    if is_v1_type(fqn) {
        if is_v1_client_builder(fqn) {
            types.push(V1_CLIENT_BUILDER.to_string());
        } else if is_v1_client(fqn) {
            // AmazonS3Client implements AmazonS3
            if let Some(interface) = fqn.strip_suffix("Client") {
                types.push(interface.to_string());
            }
        }
        if name.ends_with("Exception") && fqn != V1_SERVICE_EXCEPTION {
            types.push(V1_SERVICE_EXCEPTION.to_string());
        }
    } else if is_v2_type(fqn) && name.ends_with("Exception") {
        types.push("software.amazon.awssdk.awscore.exception.AwsServiceException".to_string());
        types.push("software.amazon.awssdk.core.exception.SdkException".to_string());
    }
    types
}

/// Types accepted where `java.io.InputStream` is expected
pub const INPUT_STREAM_TYPES: &[&str] = &[
    "java.io.InputStream",
    "java.io.FileInputStream",
    "java.io.ByteArrayInputStream",
    "java.io.BufferedInputStream",
    "java.io.DataInputStream",
    "java.io.ObjectInputStream",
    "java.io.SequenceInputStream",
    "java.util.zip.GZIPInputStream",
    RESPONSE_INPUT_STREAM,
    V1_S3_OBJECT_INPUT_STREAM,
];

pub fn is_input_stream(fqn: &str) -> bool {
    INPUT_STREAM_TYPES.contains(&fqn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_v2_kinds() {
        assert!(is_v2_model(PUT_OBJECT_REQUEST));
        assert!(!is_v2_model(S3_CLIENT));
        assert!(is_v2_client(S3_CLIENT));
        assert!(is_v2_client_builder("software.amazon.awssdk.services.sqs.SqsClientBuilder"));
        assert!(is_v2_async_builder("software.amazon.awssdk.services.sqs.SqsAsyncClientBuilder"));
        assert!(!is_v2_async_builder("software.amazon.awssdk.services.sqs.SqsClientBuilder"));
        assert_eq!(
            client_for_builder("software.amazon.awssdk.services.s3.S3ClientBuilder").as_deref(),
            Some(S3_CLIENT)
        );
    }

    #[test]
    fn test_v1_supertypes() {
        let types = supertypes("com.amazonaws.services.s3.AmazonS3Client");
        assert!(types.contains(&V1_S3_CLIENT.to_string()));

        let types = supertypes("com.amazonaws.services.s3.AmazonS3ClientBuilder");
        assert!(types.contains(&V1_CLIENT_BUILDER.to_string()));

        let types = supertypes("com.amazonaws.services.sqs.model.QueueDoesNotExistException");
        assert!(types.contains(&V1_SERVICE_EXCEPTION.to_string()));
    }

    #[test]
    fn test_input_streams() {
        assert!(is_input_stream("java.io.FileInputStream"));
        assert!(!is_input_stream("java.io.File"));
    }
}
