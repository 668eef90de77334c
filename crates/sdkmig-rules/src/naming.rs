//! v1 → v2 type naming
//!
//! [`TypeMapper`] turns a fully qualified SDK v1 type name into its v2
//! equivalent. Most names follow the conventions of v2 code generation
//! (service package renames, `Result` → `Response`, acronym normalization);
//! the remaining ones come from the static tables below.
//!
//! ```text
//! com.amazonaws.services.iot.model.DescribeJobResult
//!     → software.amazon.awssdk.services.iot.model.DescribeJobResponse
//! com.amazonaws.services.dynamodbv2.AmazonDynamoDB
//!     → software.amazon.awssdk.services.dynamodb.DynamoDbClient
//! com.amazonaws.services.s3.model.lifecycle.LifecycleFilter
//!     → software.amazon.awssdk.services.s3.model.LifecycleRuleFilter
//! ```

use std::collections::HashSet;

use sdkmig_core::logging;

pub const V1_PREFIX: &str = "com.amazonaws.";
pub const V2_PREFIX: &str = "software.amazon.awssdk.";
const V1_SERVICES: &str = "com.amazonaws.services.";
const V2_SERVICES: &str = "software.amazon.awssdk.services.";

/// Whether a type's constants are PascalCase in v1 and SCREAMING_SNAKE_CASE in v2
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    Enum,
}

/// Result of mapping one v1 type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMapping {
    pub v1: String,
    pub v2: String,
    pub kind: TypeKind,
}

impl TypeMapping {
    /// v2 class chain without the package, e.g. `LifecycleRule` or `Foo.Bar`
    pub fn v2_class_chain(&self) -> &str {
        split_fqn(&self.v2).1
    }

    /// Fully qualified name of the outermost v2 class (what gets imported)
    pub fn v2_top_level(&self) -> String {
        top_level_of(&self.v2)
    }
}

/// v1 service package → v2 service package, where they differ beyond a `v2` suffix
const SERVICE_PACKAGES: &[(&str, &str)] = &[
    ("stepfunctions", "sfn"),
    ("simpleworkflow", "swf"),
    ("simpleemail", "ses"),
    ("simpleemailv2", "sesv2"),
    ("identitymanagement", "iam"),
    ("securitytoken", "sts"),
    ("certificatemanager", "acm"),
    ("elasticmapreduce", "emr"),
    ("kinesisfirehose", "firehose"),
    ("simplesystemsmanagement", "ssm"),
    ("logs", "cloudwatchlogs"),
    ("cognitoidp", "cognitoidentityprovider"),
    ("elasticloadbalancingv2", "elasticloadbalancingv2"),
];

/// v2 service package → client / exception base name
const SERVICE_NAMES: &[(&str, &str)] = &[
    ("dynamodb", "DynamoDb"),
    ("swf", "Swf"),
    ("sfn", "Sfn"),
    ("cloudsearch", "CloudSearch"),
    ("ses", "Ses"),
    ("sesv2", "SesV2"),
    ("iam", "Iam"),
    ("sts", "Sts"),
    ("acm", "Acm"),
    ("emr", "Emr"),
    ("firehose", "Firehose"),
    ("ssm", "Ssm"),
    ("cloudwatchlogs", "CloudWatchLogs"),
    ("cognitoidentityprovider", "CognitoIdentityProvider"),
    ("elasticloadbalancingv2", "ElasticLoadBalancingV2"),
    ("cloudwatch", "CloudWatch"),
    ("secretsmanager", "SecretsManager"),
    ("s3", "S3"),
];

/// S3 model classes whose v2 name is not derived by convention
const S3_MODEL_NAMES: &[(&str, &str)] = &[
    ("GetObjectMetadataRequest", "HeadObjectRequest"),
    ("InitiateMultipartUploadRequest", "CreateMultipartUploadRequest"),
    ("InitiateMultipartUploadResult", "CreateMultipartUploadResponse"),
    ("InitiateMultipartUploadResponse", "CreateMultipartUploadResponse"),
    ("ListVersionsRequest", "ListObjectVersionsRequest"),
    ("VersionListing", "ListObjectVersionsResponse"),
    ("ObjectMetadata", "HeadObjectResponse"),
    ("ObjectListing", "ListObjectsResponse"),
    ("S3ObjectSummary", "S3Object"),
    ("S3VersionSummary", "ObjectVersion"),
    ("CorsRule", "CORSRule"),
    ("BucketCrossOriginConfiguration", "CORSConfiguration"),
    ("GetBucketCrossOriginConfigurationRequest", "GetBucketCorsRequest"),
    ("DeleteBucketCrossOriginConfigurationRequest", "DeleteBucketCorsRequest"),
    ("SetBucketCrossOriginConfigurationRequest", "PutBucketCorsRequest"),
    ("GetBucketVersioningConfigurationRequest", "GetBucketVersioningRequest"),
    ("SetBucketVersioningConfigurationRequest", "PutBucketVersioningRequest"),
    ("DeleteBucketLifecycleConfigurationRequest", "DeleteBucketLifecycleRequest"),
    ("DeleteBucketReplicationConfigurationRequest", "DeleteBucketReplicationRequest"),
    ("DeleteBucketTaggingConfigurationRequest", "DeleteBucketTaggingRequest"),
    ("DeleteBucketWebsiteConfigurationRequest", "DeleteBucketWebsiteRequest"),
    ("GetBucketLoggingConfigurationRequest", "GetBucketLoggingRequest"),
    ("GetBucketReplicationConfigurationRequest", "GetBucketReplicationRequest"),
    ("GetBucketTaggingConfigurationRequest", "GetBucketTaggingRequest"),
    ("GetBucketWebsiteConfigurationRequest", "GetBucketWebsiteRequest"),
    ("DeleteVersionRequest", "DeleteObjectRequest"),
    ("CopyPartRequest", "UploadPartCopyRequest"),
    ("CopyPartResult", "UploadPartCopyResponse"),
    ("CopyPartResponse", "UploadPartCopyResponse"),
    ("SetBucketPolicyRequest", "PutBucketPolicyRequest"),
    ("SetBucketAccelerateConfigurationRequest", "PutBucketAccelerateConfigurationRequest"),
    ("SetBucketAnalyticsConfigurationRequest", "PutBucketAnalyticsConfigurationRequest"),
    (
        "SetBucketIntelligentTieringConfigurationRequest",
        "PutBucketIntelligentTieringConfigurationRequest",
    ),
    ("SetBucketInventoryConfigurationRequest", "PutBucketInventoryConfigurationRequest"),
    ("SetBucketLifecycleConfigurationRequest", "PutBucketLifecycleConfigurationRequest"),
    ("SetBucketMetricsConfigurationRequest", "PutBucketMetricsConfigurationRequest"),
    ("SetBucketNotificationConfigurationRequest", "PutBucketNotificationConfigurationRequest"),
    ("SetBucketOwnershipControlsRequest", "PutBucketOwnershipControlsRequest"),
    ("SetBucketReplicationConfigurationRequest", "PutBucketReplicationRequest"),
    ("SetBucketTaggingConfigurationRequest", "PutBucketTaggingRequest"),
    ("SetBucketWebsiteConfigurationRequest", "PutBucketWebsiteRequest"),
    ("BucketAccelerateConfiguration", "AccelerateConfiguration"),
    ("BucketNotificationConfiguration", "NotificationConfiguration"),
    ("BucketReplicationConfiguration", "ReplicationConfiguration"),
    ("BucketTaggingConfiguration", "Tagging"),
    ("BucketWebsiteConfiguration", "WebsiteConfiguration"),
    ("LifecycleFilter", "LifecycleRuleFilter"),
    ("LifecycleAndOperator", "LifecycleRuleAndOperator"),
    ("ReplicationFilter", "ReplicationRuleFilter"),
    ("ReplicationAndOperator", "ReplicationRuleAndOperator"),
    ("PartETag", "CompletedPart"),
    ("AmazonS3Exception", "S3Exception"),
];

/// Core (non-service) types and service types outside the model packages
const CORE_TYPES: &[(&str, &str)] = &[
    ("com.amazonaws.ClientConfiguration", "software.amazon.awssdk.core.client.config.ClientOverrideConfiguration"),
    ("com.amazonaws.AmazonServiceException", "software.amazon.awssdk.awscore.exception.AwsServiceException"),
    ("com.amazonaws.AmazonClientException", "software.amazon.awssdk.core.exception.SdkException"),
    ("com.amazonaws.SdkBaseException", "software.amazon.awssdk.core.exception.SdkException"),
    ("com.amazonaws.SdkClientException", "software.amazon.awssdk.core.exception.SdkClientException"),
    ("com.amazonaws.AmazonWebServiceRequest", "software.amazon.awssdk.awscore.AwsRequest"),
    ("com.amazonaws.AmazonWebServiceResult", "software.amazon.awssdk.awscore.AwsResponse"),
    ("com.amazonaws.regions.Regions", "software.amazon.awssdk.regions.Region"),
    ("com.amazonaws.regions.Region", "software.amazon.awssdk.regions.Region"),
    ("com.amazonaws.retry.RetryMode", "software.amazon.awssdk.core.retry.RetryMode"),
    ("com.amazonaws.retry.RetryPolicy", "software.amazon.awssdk.core.retry.RetryPolicy"),
    ("com.amazonaws.client.builder.AwsClientBuilder", "software.amazon.awssdk.awscore.client.builder.AwsClientBuilder"),
    ("com.amazonaws.auth.AWSCredentials", "software.amazon.awssdk.auth.credentials.AwsCredentials"),
    ("com.amazonaws.auth.BasicAWSCredentials", "software.amazon.awssdk.auth.credentials.AwsBasicCredentials"),
    ("com.amazonaws.auth.BasicSessionCredentials", "software.amazon.awssdk.auth.credentials.AwsSessionCredentials"),
    ("com.amazonaws.auth.AWSCredentialsProvider", "software.amazon.awssdk.auth.credentials.AwsCredentialsProvider"),
    ("com.amazonaws.auth.AWSStaticCredentialsProvider", "software.amazon.awssdk.auth.credentials.StaticCredentialsProvider"),
    (
        "com.amazonaws.auth.DefaultAWSCredentialsProviderChain",
        "software.amazon.awssdk.auth.credentials.DefaultCredentialsProvider",
    ),
    (
        "com.amazonaws.auth.EnvironmentVariableCredentialsProvider",
        "software.amazon.awssdk.auth.credentials.EnvironmentVariableCredentialsProvider",
    ),
    (
        "com.amazonaws.auth.SystemPropertiesCredentialsProvider",
        "software.amazon.awssdk.auth.credentials.SystemPropertyCredentialsProvider",
    ),
    (
        "com.amazonaws.auth.profile.ProfileCredentialsProvider",
        "software.amazon.awssdk.auth.credentials.ProfileCredentialsProvider",
    ),
    (
        "com.amazonaws.auth.InstanceProfileCredentialsProvider",
        "software.amazon.awssdk.auth.credentials.InstanceProfileCredentialsProvider",
    ),
    (
        "com.amazonaws.auth.ContainerCredentialsProvider",
        "software.amazon.awssdk.auth.credentials.ContainerCredentialsProvider",
    ),
    ("com.amazonaws.auth.AnonymousAWSCredentials", "software.amazon.awssdk.auth.credentials.AnonymousCredentialsProvider"),
    ("com.amazonaws.services.s3.AmazonS3URI", "software.amazon.awssdk.services.s3.S3Uri"),
    ("com.amazonaws.services.s3.S3ClientOptions", "software.amazon.awssdk.services.s3.S3Configuration"),
    ("com.amazonaws.services.s3.model.S3ObjectInputStream", "software.amazon.awssdk.core.ResponseInputStream"),
    ("com.amazonaws.services.s3.transfer.TransferManager", "software.amazon.awssdk.transfer.s3.S3TransferManager"),
    ("com.amazonaws.services.s3.transfer.TransferManagerBuilder", "software.amazon.awssdk.transfer.s3.S3TransferManager"),
    ("com.amazonaws.services.s3.transfer.Upload", "software.amazon.awssdk.transfer.s3.model.FileUpload"),
    ("com.amazonaws.services.s3.transfer.Download", "software.amazon.awssdk.transfer.s3.model.FileDownload"),
    ("com.amazonaws.services.s3.transfer.Copy", "software.amazon.awssdk.transfer.s3.model.Copy"),
    ("com.amazonaws.services.s3.transfer.MultipleFileDownload", "software.amazon.awssdk.transfer.s3.model.DirectoryDownload"),
    ("com.amazonaws.services.s3.transfer.PersistableDownload", "software.amazon.awssdk.transfer.s3.model.ResumableFileDownload"),
    ("com.amazonaws.services.s3.transfer.PersistableUpload", "software.amazon.awssdk.transfer.s3.model.ResumableFileUpload"),
    (
        "com.amazonaws.services.s3.event.S3EventNotification",
        "software.amazon.awssdk.eventnotifications.s3.model.S3EventNotification",
    ),
    ("com.amazonaws.util.IOUtils", "software.amazon.awssdk.utils.IoUtils"),
];

/// Nested v1 types that became top-level (or moved) in v2
const NESTED_TYPES: &[(&str, &str)] = &[
    (
        "com.amazonaws.services.s3.model.BucketLifecycleConfiguration.Rule",
        "software.amazon.awssdk.services.s3.model.LifecycleRule",
    ),
    (
        "com.amazonaws.services.s3.model.BucketLifecycleConfiguration.Transition",
        "software.amazon.awssdk.services.s3.model.Transition",
    ),
    (
        "com.amazonaws.services.s3.model.BucketLifecycleConfiguration.NoncurrentVersionTransition",
        "software.amazon.awssdk.services.s3.model.NoncurrentVersionTransition",
    ),
    (
        "com.amazonaws.services.s3.model.DeleteObjectsRequest.KeyVersion",
        "software.amazon.awssdk.services.s3.model.ObjectIdentifier",
    ),
    (
        "com.amazonaws.services.s3.model.DeleteObjectsResult.DeletedObject",
        "software.amazon.awssdk.services.s3.model.DeletedObject",
    ),
    (
        "com.amazonaws.services.s3.model.MultiObjectDeleteException.DeleteError",
        "software.amazon.awssdk.services.s3.model.S3Error",
    ),
    (
        "com.amazonaws.services.s3.model.RequestPaymentConfiguration.Payer",
        "software.amazon.awssdk.services.s3.model.Payer",
    ),
    (
        "com.amazonaws.services.s3.event.S3EventNotification.S3EventNotificationRecord",
        "software.amazon.awssdk.eventnotifications.s3.model.S3EventNotificationRecord",
    ),
];

/// v1 types whose constants are PascalCase enum values
const ENUM_TYPES: &[&str] = &[
    "com.amazonaws.services.s3.model.StorageClass",
    "com.amazonaws.services.s3.model.CannedAccessControlList",
    "com.amazonaws.services.s3.model.Permission",
    "com.amazonaws.services.s3.model.Tier",
    "com.amazonaws.services.s3.model.MetadataDirective",
    "com.amazonaws.services.s3.model.ObjectLockMode",
    "com.amazonaws.services.s3.model.ObjectLockRetentionMode",
    "com.amazonaws.services.s3.model.ObjectLockLegalHoldStatus",
    "com.amazonaws.services.s3.model.ObjectOwnership",
    "com.amazonaws.services.s3.model.BucketAccelerateStatus",
    "com.amazonaws.services.s3.model.ReplicationRuleStatus",
    "com.amazonaws.services.s3.model.DeleteMarkerReplicationStatus",
    "com.amazonaws.services.s3.model.ExistingObjectReplicationStatus",
    "com.amazonaws.services.s3.model.ExpressionType",
    "com.amazonaws.services.s3.model.CompressionType",
    "com.amazonaws.services.s3.model.FileHeaderInfo",
    "com.amazonaws.services.s3.model.QuoteFields",
    "com.amazonaws.services.s3.model.JSONType",
    "com.amazonaws.services.s3.model.SSEAlgorithm",
    "com.amazonaws.services.s3.model.Event",
    "com.amazonaws.services.s3.model.RequestPayer",
    "com.amazonaws.services.s3.model.RequestPaymentConfiguration.Payer",
    "com.amazonaws.services.s3.model.inventory.InventoryFrequency",
    "com.amazonaws.services.s3.model.inventory.InventoryFormat",
    "com.amazonaws.services.s3.model.inventory.InventoryIncludedObjectVersions",
    "com.amazonaws.services.s3.model.inventory.InventoryOptionalField",
    "com.amazonaws.services.s3.model.intelligenttiering.IntelligentTieringAccessTier",
    "com.amazonaws.services.s3.model.intelligenttiering.IntelligentTieringStatus",
    "com.amazonaws.services.s3.model.analytics.AnalyticsS3ExportFileFormat",
    "com.amazonaws.services.s3.model.analytics.StorageClassAnalysisSchemaVersion",
    "com.amazonaws.services.s3.model.ownership.ObjectOwnership",
    "com.amazonaws.retry.RetryMode",
];

/// Maps v1 fully qualified names to v2
#[derive(Debug, Clone, Default)]
pub struct TypeMapper {
    excluded_namespaces: Vec<String>,
    v2_enums: HashSet<String>,
}

impl TypeMapper {
    /// Create a mapper that leaves the given namespaces (custom SDK builds) untouched
    pub fn new(excluded_namespaces: Vec<String>) -> Self {
        let mut mapper = Self {
            excluded_namespaces,
            v2_enums: HashSet::new(),
        };
        let enums: HashSet<String> = ENUM_TYPES
            .iter()
            .filter_map(|v1| mapper.map(v1))
            .map(|mapping| mapping.v2)
            .collect();
        mapper.v2_enums = enums;
        mapper
    }

    /// Map a v1 type. `None` means no rewrite applies.
    pub fn map(&self, v1_fqn: &str) -> Option<TypeMapping> {
        if !v1_fqn.starts_with(V1_PREFIX) {
            return None;
        }
        if self.is_custom_sdk(v1_fqn) {
            logging::log(&format!(
                "Skipping transformation for {} because it is a custom SDK",
                v1_fqn
            ));
            return None;
        }

        let v2 = v2_equivalent(v1_fqn)?;
        let kind = if ENUM_TYPES.contains(&v1_fqn) {
            TypeKind::Enum
        } else {
            TypeKind::Class
        };
        Some(TypeMapping {
            v1: v1_fqn.to_string(),
            v2,
            kind,
        })
    }

    /// Map a v1 wildcard import package (`com.amazonaws.services.iot.model`)
    pub fn map_wildcard(&self, v1_package: &str) -> Option<String> {
        let rest = v1_package.strip_prefix(V1_SERVICES)?;
        if self.is_custom_sdk(v1_package) {
            return None;
        }
        let mut segments = rest.split('.');
        let service = segments.next().filter(|s| !s.is_empty())?;
        let sub: Vec<&str> = segments.collect();
        let package = match sub.first() {
            None => format!("{}{}", V2_SERVICES, service_package(service)),
            Some(&"model") => format!("{}{}.model", V2_SERVICES, service_package(service)),
            Some(_) => return None,
        };
        Some(package)
    }

    /// True for types living under a configured excluded namespace
    pub fn is_custom_sdk(&self, fqn: &str) -> bool {
        self.excluded_namespaces
            .iter()
            .any(|ns| fqn == ns || fqn.starts_with(&format!("{}.", ns.trim_end_matches('.'))))
    }

    /// True when a v2 type's constants are SCREAMING_SNAKE_CASE enum values
    pub fn is_v2_enum(&self, v2_fqn: &str) -> bool {
        self.v2_enums.contains(v2_fqn)
    }
}

fn v2_equivalent(v1_fqn: &str) -> Option<String> {
    if let Some((_, v2)) = CORE_TYPES.iter().find(|(v1, _)| *v1 == v1_fqn) {
        return Some(v2.to_string());
    }
    if let Some((_, v2)) = NESTED_TYPES.iter().find(|(v1, _)| *v1 == v1_fqn) {
        return Some(v2.to_string());
    }

    let (package, chain) = split_fqn(v1_fqn);
    if chain.contains('.') {
        // Map the outermost class and keep the inner segments
        let (outer, inner) = chain.split_once('.')?;
        let outer_v2 = v2_equivalent(&format!("{}.{}", package, outer))?;
        return Some(format!("{}.{}", outer_v2, inner));
    }

    let rest = package.strip_prefix(V1_SERVICES)?;
    let mut segments = rest.split('.');
    let service = segments.next()?;
    let sub: Vec<&str> = segments.collect();
    let v2_service = service_package(service);

    match sub.first() {
        Some(&"model") => {
            let name = model_class_name(&v2_service, chain);
            Some(format!("{}{}.model.{}", V2_SERVICES, v2_service, name))
        }
        None => {
            let name = if chain.ends_with("Exception") {
                service_exception_name(&v2_service, chain)?
            } else if is_client_like(chain) {
                client_name(&v2_service, chain)?
            } else {
                // Other service-root classes (ResultConfiguration, ...) are POJOs
                model_class_name(&v2_service, chain)
            };
            Some(format!("{}{}.{}", V2_SERVICES, v2_service, name))
        }
        Some(_) => None,
    }
}

/// v2 package segment for a v1 service package segment
pub fn service_package(v1_service: &str) -> String {
    if let Some((_, v2)) = SERVICE_PACKAGES.iter().find(|(v1, _)| *v1 == v1_service) {
        return v2.to_string();
    }
    v1_service
        .strip_suffix("v2")
        .filter(|s| !s.is_empty())
        .unwrap_or(v1_service)
        .to_string()
}

fn service_name(v2_service: &str) -> Option<&'static str> {
    SERVICE_NAMES
        .iter()
        .find(|(svc, _)| *svc == v2_service)
        .map(|(_, name)| *name)
}

fn model_class_name(v2_service: &str, name: &str) -> String {
    if v2_service == "s3" {
        if let Some((_, v2)) = S3_MODEL_NAMES.iter().find(|(v1, _)| *v1 == name) {
            return v2.to_string();
        }
    }
    if is_service_exception(name) {
        if let Some(exception) = service_exception_name(v2_service, name) {
            return exception;
        }
    }
    let name = match name.strip_suffix("Result") {
        Some(base) => format!("{}Response", base),
        None => name.to_string(),
    };
    normalize_acronyms(&name)
}

fn strip_vendor_prefix(name: &str) -> &str {
    let name = name.strip_prefix("Abstract").unwrap_or(name);
    name.strip_prefix("Amazon")
        .or_else(|| name.strip_prefix("AWS"))
        .unwrap_or(name)
}

fn is_client_like(name: &str) -> bool {
    let base = name.strip_prefix("Abstract").unwrap_or(name);
    (base.starts_with("Amazon") || base.starts_with("AWS")) && strip_vendor_prefix(name).len() < base.len()
}

/// `AWSStepFunctionsException`, `AmazonIOTException`
fn is_service_exception(name: &str) -> bool {
    name.ends_with("Exception") && (name.starts_with("Amazon") || name.starts_with("AWS"))
}

fn service_base(v2_service: &str, stripped: &str) -> String {
    match service_name(v2_service) {
        Some(name) => name.to_string(),
        None => normalize_acronyms(stripped),
    }
}

fn service_exception_name(v2_service: &str, name: &str) -> Option<String> {
    let stripped = strip_vendor_prefix(name).strip_suffix("Exception")?;
    if stripped.is_empty() {
        return None;
    }
    Some(format!("{}Exception", service_base(v2_service, stripped)))
}

fn client_name(v2_service: &str, name: &str) -> Option<String> {
    let stripped = strip_vendor_prefix(name);
    let (base, suffix) = if let Some(base) = stripped.strip_suffix("AsyncClientBuilder") {
        (base, "AsyncClientBuilder")
    } else if let Some(base) = stripped.strip_suffix("ClientBuilder") {
        (base, "ClientBuilder")
    } else if let Some(base) = stripped.strip_suffix("AsyncClient") {
        (base, "AsyncClient")
    } else if let Some(base) = stripped.strip_suffix("Async") {
        (base, "AsyncClient")
    } else if let Some(base) = stripped.strip_suffix("Client") {
        (base, "Client")
    } else {
        (stripped, "Client")
    };
    if base.is_empty() {
        return None;
    }
    Some(format!("{}{}", service_base(v2_service, base), suffix))
}

/// Rewrite upper-case runs the way v2 code generation does
///
/// `ListCACertificates` → `ListCaCertificates`, `DynamoDB` → `DynamoDb`,
/// `EC2` → `Ec2`. The last capital of a run followed by a lower-case letter
/// starts the next word; digits end a run.
pub fn normalize_acronyms(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len());
    let mut i = 0;
    while i < chars.len() {
        if !chars[i].is_ascii_uppercase() {
            out.push(chars[i]);
            i += 1;
            continue;
        }
        let start = i;
        let mut run_end = i;
        while run_end < chars.len() && chars[run_end].is_ascii_uppercase() {
            run_end += 1;
        }
        let followed_by_lower = run_end < chars.len() && chars[run_end].is_ascii_lowercase();
        let acronym_end = if run_end - start >= 2 && followed_by_lower {
            run_end - 1
        } else {
            run_end
        };
        out.push(chars[start]);
        if acronym_end - start >= 2 {
            out.extend(chars[start + 1..acronym_end].iter().map(|c| c.to_ascii_lowercase()));
        } else {
            out.extend(&chars[start + 1..acronym_end]);
        }
        i = acronym_end;
    }
    out
}

/// v2 member name for a v1 accessor (`withBucketName` → `bucketName`,
/// `setSSECustomerKey` → `sseCustomerKey`, `isTruncated` → `truncated`)
pub fn v2_member_name(method: &str) -> String {
    let base = ["with", "set", "get", "is"]
        .iter()
        .find_map(|prefix| {
            method
                .strip_prefix(prefix)
                .filter(|rest| rest.starts_with(|c: char| c.is_ascii_uppercase()))
        })
        .unwrap_or(method);
    lower_camel(base)
}

/// Lower-case the leading word, treating a leading acronym as one word
pub fn lower_camel(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let run = chars.iter().take_while(|c| c.is_ascii_uppercase()).count();
    let lower = match run {
        0 => 0,
        1 => 1,
        n if n < chars.len() && chars[n].is_ascii_lowercase() => n - 1,
        n => n,
    };
    chars
        .iter()
        .enumerate()
        .map(|(i, c)| if i < lower { c.to_ascii_lowercase() } else { *c })
        .collect()
}

/// Split a fully qualified name at the first capitalized segment
///
/// `com.foo.Outer.Inner` → (`com.foo`, `Outer.Inner`)
pub fn split_fqn(fqn: &str) -> (&str, &str) {
    let mut offset = 0;
    for segment in fqn.split('.') {
        if segment.starts_with(|c: char| c.is_ascii_uppercase()) {
            let package = if offset == 0 { "" } else { &fqn[..offset - 1] };
            return (package, &fqn[offset..]);
        }
        offset += segment.len() + 1;
    }
    (fqn, "")
}

/// Fully qualified name of the outermost class of `fqn`
pub fn top_level_of(fqn: &str) -> String {
    let (package, chain) = split_fqn(fqn);
    let outer = chain.split('.').next().unwrap_or(chain);
    if package.is_empty() {
        outer.to_string()
    } else {
        format!("{}.{}", package, outer)
    }
}

/// Last dotted segment
pub fn simple_name(fqn: &str) -> &str {
    fqn.rsplit('.').next().unwrap_or(fqn)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v2(v1: &str) -> String {
        TypeMapper::new(Vec::new())
            .map(v1)
            .map(|m| m.v2)
            .unwrap_or_default()
    }

    #[test]
    fn test_model_classes() {
        assert_eq!(
            v2("com.amazonaws.services.iot.model.DescribeJobResult"),
            "software.amazon.awssdk.services.iot.model.DescribeJobResponse"
        );
        assert_eq!(
            v2("com.amazonaws.services.iot.model.DescribeJobRequest"),
            "software.amazon.awssdk.services.iot.model.DescribeJobRequest"
        );
        assert_eq!(
            v2("com.amazonaws.services.iot.ResultConfigurationResult"),
            "software.amazon.awssdk.services.iot.ResultConfigurationResponse"
        );
        assert_eq!(
            v2("com.amazonaws.services.iot.ListCACertificatesRequest"),
            "software.amazon.awssdk.services.iot.ListCaCertificatesRequest"
        );
    }

    #[test]
    fn test_service_package_renames() {
        assert_eq!(
            v2("com.amazonaws.services.stepfunctions.model.DeleteActivityRequest"),
            "software.amazon.awssdk.services.sfn.model.DeleteActivityRequest"
        );
        assert_eq!(
            v2("com.amazonaws.services.stepfunctions.model.AWSStepFunctionsException"),
            "software.amazon.awssdk.services.sfn.model.SfnException"
        );
        assert_eq!(
            v2("com.amazonaws.services.cloudsearchv2.AmazonCloudSearchClient"),
            "software.amazon.awssdk.services.cloudsearch.CloudSearchClient"
        );
    }

    #[test]
    fn test_clients() {
        assert_eq!(
            v2("com.amazonaws.services.dynamodbv2.AmazonDynamoDB"),
            "software.amazon.awssdk.services.dynamodb.DynamoDbClient"
        );
        assert_eq!(
            v2("com.amazonaws.services.simpleworkflow.AmazonSimpleWorkflowClient"),
            "software.amazon.awssdk.services.swf.SwfClient"
        );
        for v1 in ["AWSIot", "AWSIotClient", "AbstractAWSIot"] {
            assert_eq!(
                v2(&format!("com.amazonaws.services.iot.{}", v1)),
                "software.amazon.awssdk.services.iot.IotClient"
            );
        }
        for v1 in ["AWSIotAsync", "AWSIotAsyncClient", "AbstractAWSIotAsync"] {
            assert_eq!(
                v2(&format!("com.amazonaws.services.iot.{}", v1)),
                "software.amazon.awssdk.services.iot.IotAsyncClient"
            );
        }
        assert_eq!(
            v2("com.amazonaws.services.iot.AWSIotClientBuilder"),
            "software.amazon.awssdk.services.iot.IotClientBuilder"
        );
        assert_eq!(
            v2("com.amazonaws.services.iot.AWSIotAsyncClientBuilder"),
            "software.amazon.awssdk.services.iot.IotAsyncClientBuilder"
        );
        assert_eq!(
            v2("com.amazonaws.services.s3.AmazonS3ClientBuilder"),
            "software.amazon.awssdk.services.s3.S3ClientBuilder"
        );
    }

    #[test]
    fn test_service_exception() {
        assert_eq!(
            v2("com.amazonaws.services.iot.AmazonIOTException"),
            "software.amazon.awssdk.services.iot.IotException"
        );
    }

    #[test]
    fn test_s3_special_cases() {
        assert_eq!(
            v2("com.amazonaws.services.s3.model.GetObjectMetadataRequest"),
            "software.amazon.awssdk.services.s3.model.HeadObjectRequest"
        );
        assert_eq!(
            v2("com.amazonaws.services.s3.model.ObjectMetadata"),
            "software.amazon.awssdk.services.s3.model.HeadObjectResponse"
        );
        assert_eq!(
            v2("com.amazonaws.services.s3.model.BucketTaggingConfiguration"),
            "software.amazon.awssdk.services.s3.model.Tagging"
        );
        assert_eq!(
            v2("com.amazonaws.services.s3.model.PartETag"),
            "software.amazon.awssdk.services.s3.model.CompletedPart"
        );
        assert_eq!(
            v2("com.amazonaws.services.s3.model.lifecycle.LifecycleFilter"),
            "software.amazon.awssdk.services.s3.model.LifecycleRuleFilter"
        );
        assert_eq!(
            v2("com.amazonaws.services.s3.model.inventory.InventoryFrequency"),
            "software.amazon.awssdk.services.s3.model.InventoryFrequency"
        );
    }

    #[test]
    fn test_core_and_nested_types() {
        assert_eq!(
            v2("com.amazonaws.ClientConfiguration"),
            "software.amazon.awssdk.core.client.config.ClientOverrideConfiguration"
        );
        assert_eq!(
            v2("com.amazonaws.services.s3.model.BucketLifecycleConfiguration.Rule"),
            "software.amazon.awssdk.services.s3.model.LifecycleRule"
        );
        // Unlisted nested types keep their inner segment
        assert_eq!(
            v2("com.amazonaws.services.sqs.model.SendMessageResult.Inner"),
            "software.amazon.awssdk.services.sqs.model.SendMessageResponse.Inner"
        );
    }

    #[test]
    fn test_enum_kind_is_preserved() {
        let mapper = TypeMapper::new(Vec::new());
        let mapping = mapper.map("com.amazonaws.services.s3.model.StorageClass").unwrap();
        assert_eq!(mapping.kind, TypeKind::Enum);
        assert!(mapper.is_v2_enum("software.amazon.awssdk.services.s3.model.StorageClass"));
        let mapping = mapper.map("com.amazonaws.services.s3.model.PutObjectRequest").unwrap();
        assert_eq!(mapping.kind, TypeKind::Class);
    }

    #[test]
    fn test_v2_names_never_map() {
        let mapper = TypeMapper::new(Vec::new());
        assert!(mapper.map("software.amazon.awssdk.services.s3.S3Client").is_none());
        assert!(mapper.map("java.util.List").is_none());
        assert!(mapper.map("com.amazonaws.services.s3.transfer.model.UploadResult").is_none());
    }

    #[test]
    fn test_custom_sdk_is_skipped() {
        let mapper = TypeMapper::new(vec!["com.amazonaws.services.acme".to_string()]);
        assert!(mapper.map("com.amazonaws.services.acme.model.FooRequest").is_none());
        assert!(mapper.map_wildcard("com.amazonaws.services.acme.model").is_none());
        assert!(mapper.map("com.amazonaws.services.sqs.model.SendMessageRequest").is_some());
    }

    #[test]
    fn test_wildcards() {
        let mapper = TypeMapper::new(Vec::new());
        assert_eq!(
            mapper.map_wildcard("com.amazonaws.services.iot.model").as_deref(),
            Some("software.amazon.awssdk.services.iot.model")
        );
        assert_eq!(
            mapper.map_wildcard("com.amazonaws.services.iot").as_deref(),
            Some("software.amazon.awssdk.services.iot")
        );
        assert_eq!(
            mapper.map_wildcard("com.amazonaws.services.cloudsearchv2").as_deref(),
            Some("software.amazon.awssdk.services.cloudsearch")
        );
    }

    #[test]
    fn test_acronyms_and_member_names() {
        assert_eq!(normalize_acronyms("ListCACertificates"), "ListCaCertificates");
        assert_eq!(normalize_acronyms("DynamoDB"), "DynamoDb");
        assert_eq!(normalize_acronyms("EC2"), "Ec2");
        assert_eq!(normalize_acronyms("S3"), "S3");
        assert_eq!(v2_member_name("withBucketName"), "bucketName");
        assert_eq!(v2_member_name("setSSECustomerKey"), "sseCustomerKey");
        assert_eq!(v2_member_name("getETag"), "eTag");
        assert_eq!(v2_member_name("withACL"), "acl");
        assert_eq!(v2_member_name("settings"), "settings");
    }

    #[test]
    fn test_split_fqn() {
        assert_eq!(
            split_fqn("com.foo.Outer.Inner"),
            ("com.foo", "Outer.Inner")
        );
        assert_eq!(top_level_of("com.foo.Outer.Inner"), "com.foo.Outer");
        assert_eq!(simple_name("com.foo.Outer.Inner"), "Inner");
    }
}
