//! Rule: s3_put_object_payload
//!
//! A v1 `PutObjectRequest` carries its payload (`file` / `inputStream`) and
//! its `ObjectMetadata`; in v2 the payload is a separate `RequestBody`
//! argument and the metadata fields live on the request itself.
//!
//! The rule runs in two passes over the file. The first pass collects
//! payloads from request builder chains and `req.setFile(f);` statements,
//! keyed by the variable that receives the request (or by the call the
//! request is passed to inline), and folds recorded metadata setters into
//! the request. The second pass re-attaches each payload where the request
//! is consumed.
//!
//! Pattern:
//! ```java
//! // Before
//! PutObjectRequest request = PutObjectRequest.builder().bucket(b).key(k).file(file).build();
//! s3.putObject(request);
//! tm.upload(request);
//!
//! // After
//! PutObjectRequest request = PutObjectRequest.builder().bucket(b).key(k).build();
//! s3.putObject(request, RequestBody.fromFile(file));
//! tm.uploadFile(UploadFileRequest.builder().putObjectRequest(request).source(file).build());
//! ```
//!
//! A payload that no consumer picks up stays on the request and is
//! annotated.

use std::collections::{HashMap, HashSet};

use sdkmig_core::ast::*;
use sdkmig_core::{logging, visit, Edit, Scope, Span, Visitor};

use crate::comments;
use crate::context::MigrationContext;
use crate::imports::ImportEditor;
use crate::registry::{Category, Rule, RuleError};
use crate::resolve::TypeResolver;
use crate::sdk_types::{
    is_input_stream, package_of, ASYNC_REQUEST_BODY, HEAD_OBJECT_RESPONSE, PUT_OBJECT_REQUEST,
    REQUEST_BODY, REQUEST_PAYER, S3_CLIENT, S3_TRANSFER_MANAGER, V2_S3_MODEL, V2_TRANSFER_MODEL,
};

const BUFFERING_WARNING: &str = "When using InputStream, we'll need to buffer the entire stream into memory to \
     compute the content length. Consider using RequestBody.fromInputStream(inputStream, contentLength) if the \
     content length is known.";
const TM_STREAM_WARNING: &str =
    "When using InputStream to upload with TransferManager, you must specify Content-Length and ExecutorService.";
const UNCONSUMED_PAYLOAD: &str = "This payload is no longer part of the v2 PutObjectRequest. Pass it as a \
     RequestBody (or AsyncRequestBody) wherever the request is used.";

/// v1 `ObjectMetadata` setters with a `PutObjectRequest` field
const METADATA_FIELDS: &[(&str, &str)] = &[
    ("setContentLength", "contentLength"),
    ("setContentType", "contentType"),
    ("setContentEncoding", "contentEncoding"),
    ("setContentLanguage", "contentLanguage"),
    ("setContentDisposition", "contentDisposition"),
    ("setCacheControl", "cacheControl"),
    ("setContentMD5", "contentMD5"),
    ("setSSEAlgorithm", "serverSideEncryption"),
    ("setUserMetadata", "metadata"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PayloadKind {
    File,
    InputStream,
}

#[derive(Debug, Clone)]
struct Payload {
    kind: PayloadKind,
    value: String,
    length: Option<String>,
    /// Text removed from the request once the payload is attached elsewhere
    removal: Span,
    /// Where the "not attached" comment goes
    anchor: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Collect,
    Attach,
}

/// What receives the value of the expression being visited
#[derive(Debug, Clone)]
enum Owner {
    Variable(String),
    /// Argument of the call starting at this offset
    Call { name: String, start: usize },
    Other,
}

pub fn check_s3_put_object_payload(unit: &CompilationUnit, source: &str) -> Vec<Edit> {
    if !["PutObjectRequest", "putObject", "HeadObjectResponse", "requestPayer", "RequesterPays"]
        .iter()
        .any(|marker| source.contains(marker))
    {
        return Vec::new();
    }

    let resolver = TypeResolver::new(unit, source);
    let mut checker = PutObjectPayloadChecker {
        source,
        resolver: &resolver,
        imports: ImportEditor::new(unit, source),
        phase: Phase::Collect,
        owners: Vec::new(),
        handled: HashSet::new(),
        payloads: MigrationContext::new(),
        attached: HashMap::new(),
        metadata: HashMap::new(),
        lengths: HashMap::new(),
        edits: Vec::new(),
    };
    visit(&mut checker, unit, source);
    checker.phase = Phase::Attach;
    visit(&mut checker, unit, source);

    let PutObjectPayloadChecker {
        imports,
        payloads,
        mut edits,
        ..
    } = checker;

    let summary = payloads.finish();
    for payload in summary.consumed {
        edits.push(Edit::delete(payload.removal, "Move the payload into the request body"));
    }
    for payload in summary.pending {
        logging::log(&format!(
            "Payload `{}` is not passed to putObject/upload; left on the request",
            payload.value
        ));
        edits.extend(comments::annotate(source, payload.anchor, UNCONSUMED_PAYLOAD));
    }

    let import_edits = imports.finish(&edits);
    edits.extend(import_edits);
    edits
}

struct PutObjectPayloadChecker<'a, 'r> {
    source: &'a str,
    resolver: &'r TypeResolver<'a>,
    imports: ImportEditor<'a>,
    phase: Phase,
    owners: Vec<Owner>,
    /// End offsets of chain links already examined
    handled: HashSet<usize>,
    payloads: MigrationContext<Payload>,
    /// Payloads already attached once, for requests used again
    attached: HashMap<String, Payload>,
    /// `ObjectMetadata` variable → request fields
    metadata: HashMap<String, Vec<(String, String)>>,
    /// Request variable → content length from its metadata
    lengths: HashMap<String, String>,
    edits: Vec<Edit>,
}

impl PutObjectPayloadChecker<'_, '_> {
    fn get_text(&self, span: Span) -> &str {
        span.text(self.source)
    }

    fn type_name(&self, expr: &Expr) -> Option<String> {
        self.resolver.type_of(expr).filter(|ty| !ty.is_static).map(|ty| ty.name)
    }

    fn owner_key(&self) -> Option<String> {
        match self.owners.last()? {
            Owner::Variable(name) => Some(name.clone()),
            Owner::Call { name, start } if name == "putObject" || name == "upload" => {
                Some(inline_key(*start))
            }
            _ => None,
        }
    }

    /// Statement-level setters: `metadata.setX(v);`, `request.setFile(f);`
    fn check_setter_statement(&mut self, call: &MethodInvocation, span: Span) -> bool {
        let Some(target) = call.target.as_deref() else {
            return false;
        };
        let Some(var) = target.as_identifier() else {
            return false;
        };
        if call.args.len() != 1 {
            return false;
        }
        let Some(ty) = self.type_name(target) else {
            return false;
        };
        let name = call.name.name.as_str();
        let arg = &call.args.items[0];

        if ty == HEAD_OBJECT_RESPONSE && name.starts_with("set") {
            match METADATA_FIELDS.iter().find(|(setter, _)| *setter == name) {
                Some((_, field)) => {
                    let value = self.field_value(field, arg);
                    self.metadata
                        .entry(var.name.clone())
                        .or_default()
                        .push((field.to_string(), value));
                    self.edits.push(Edit::delete(
                        line_span(self.source, span),
                        format!("Move {}() onto the PutObjectRequest", name),
                    ));
                }
                None => {
                    let message = format!(
                        "Transform for ObjectMetadata setter - {} - is not supported, please manually migrate \
                         the code by setting it on the v2 request/response object.",
                        name
                    );
                    self.edits.extend(comments::annotate(self.source, span.start, &message));
                }
            }
            return true;
        }

        if ty == PUT_OBJECT_REQUEST {
            let kind = match name {
                "setFile" => Some(PayloadKind::File),
                "setInputStream" => Some(PayloadKind::InputStream),
                _ => None,
            };
            if let Some(kind) = kind {
                let payload = Payload {
                    kind,
                    value: self.get_text(arg.span()).to_string(),
                    length: None,
                    removal: line_span(self.source, span),
                    anchor: span.start,
                };
                self.payloads.record(&var.name, payload);
                return true;
            }
            if name == "setMetadata" {
                return self.check_set_metadata(&var.name, arg, span);
            }
        }

        if package_of(&ty) == V2_S3_MODEL && (name == "setRequesterPays" || name == "setRequestPayer") {
            if call.has_single_bool_arg(true) {
                self.edits.push(Edit::new(
                    Span::new(call.name.span.start, call.span.end),
                    "setRequestPayer(RequestPayer.REQUESTER)",
                    "Replace requester pays flag with RequestPayer.REQUESTER",
                ));
                self.imports.maybe_add_import(REQUEST_PAYER);
                return true;
            }
            if call.has_single_bool_arg(false) {
                self.edits.push(Edit::delete(
                    line_span(self.source, span),
                    "Remove requester pays flag (v2 has no value for false)",
                ));
                return true;
            }
        }
        false
    }

    /// `request.setMetadata(metadata);` → `request = request.toBuilder().contentLength(..).build();`
    fn check_set_metadata(&mut self, request: &str, arg: &Expr, span: Span) -> bool {
        let Some(metadata) = arg.as_identifier() else {
            return false;
        };
        let Some(fields) = self.metadata.get(&metadata.name) else {
            return false;
        };
        if let Some(length) = content_length(fields) {
            self.lengths.insert(request.to_string(), length);
        }
        let replacement = format!(
            "{} = {}.toBuilder(){}.build();",
            request,
            request,
            fluent_fields(fields)
        );
        self.edits.push(Edit::new(
            span,
            replacement,
            "Move ObjectMetadata fields onto the PutObjectRequest",
        ));
        true
    }

    /// Content length literals become `long`
    fn field_value(&self, field: &str, arg: &Expr) -> String {
        let text = self.get_text(arg.span());
        match arg.as_literal() {
            Some(lit) if field == "contentLength" && lit.kind == LiteralKind::Integer => format!("{}L", text),
            _ => text.to_string(),
        }
    }

    /// `requestPayer(true)` / `requesterPays(false)` on an S3 request builder
    fn check_request_payer(&mut self, call: &MethodInvocation) {
        if call.name.name != "requestPayer" && call.name.name != "requesterPays" {
            return;
        }
        let Some(target) = call.target.as_deref() else {
            return;
        };
        let Some(ty) = self.type_name(target) else {
            return;
        };
        let Some(model) = ty.strip_suffix(".Builder") else {
            return;
        };
        if package_of(model) != V2_S3_MODEL {
            return;
        }
        if call.has_single_bool_arg(true) {
            self.edits.push(Edit::new(
                Span::new(call.name.span.start, call.span.end),
                "requestPayer(RequestPayer.REQUESTER)",
                "Replace requester pays flag with RequestPayer.REQUESTER",
            ));
            self.imports.maybe_add_import(REQUEST_PAYER);
        } else if call.has_single_bool_arg(false) {
            self.edits.push(Edit::delete(
                Span::new(target.span().end, call.span.end),
                "Remove requester pays flag (v2 has no value for false)",
            ));
        }
    }

    /// Collect the payload of a `PutObjectRequest` builder chain and fold its
    /// metadata into fluent calls
    fn check_chain(&mut self, call: &MethodInvocation) {
        if self.handled.contains(&call.span.end) {
            return;
        }
        let (links, _) = call.chain();
        for link in &links {
            self.handled.insert(link.span.end);
        }

        let builder = format!("{}.Builder", PUT_OBJECT_REQUEST);
        let mut payload = None;
        let mut length = None;
        for link in links.iter().rev() {
            let Some(target) = link.target.as_deref() else {
                continue;
            };
            if link.args.len() != 1 || self.type_name(target).as_deref() != Some(builder.as_str()) {
                continue;
            }
            let arg = &link.args.items[0];
            match link.name.name.as_str() {
                "file" | "inputStream" => {
                    let kind = if link.name.name == "file" {
                        PayloadKind::File
                    } else {
                        PayloadKind::InputStream
                    };
                    payload = Some(Payload {
                        kind,
                        value: self.get_text(arg.span()).to_string(),
                        length: None,
                        removal: Span::new(target.span().end, link.span.end),
                        anchor: link.name.span.start,
                    });
                }
                "metadata" => {
                    let Some(fields) = arg.as_identifier().and_then(|m| self.metadata.get(&m.name)) else {
                        continue;
                    };
                    length = content_length(fields).or(length);
                    let edit = if fields.is_empty() {
                        Edit::delete(Span::new(target.span().end, link.span.end), "Remove empty ObjectMetadata")
                    } else {
                        Edit::new(
                            Span::new(link.name.span.start, link.span.end),
                            fluent_fields(fields).trim_start_matches('.').to_string(),
                            "Move ObjectMetadata fields onto the PutObjectRequest",
                        )
                    };
                    self.edits.push(edit);
                }
                _ => {}
            }
        }

        let Some(key) = self.owner_key() else {
            return;
        };
        if let Some(length) = &length {
            self.lengths.insert(key.clone(), length.clone());
        }
        if let Some(mut payload) = payload {
            payload.length = length;
            self.payloads.record(&key, payload);
        }
    }

    /// The payload of the request passed as `arg` to the call starting at `call_start`
    fn payload_for(&mut self, arg: &Expr, call_start: usize) -> (Option<Payload>, Option<String>) {
        let key = match arg.as_identifier() {
            Some(ident) => ident.name.clone(),
            None => inline_key(call_start),
        };
        let payload = match self.payloads.take(&key).cloned() {
            Some(payload) => {
                self.attached.insert(key.clone(), payload.clone());
                Some(payload)
            }
            None => self.attached.get(&key).cloned(),
        };
        let length = payload
            .as_ref()
            .and_then(|p| p.length.clone())
            .or_else(|| self.lengths.get(&key).cloned());
        (payload, length)
    }

    fn request_body(&mut self, payload: Option<&Payload>, length: Option<&str>, call: &MethodInvocation) -> String {
        self.imports.maybe_add_import(REQUEST_BODY);
        match payload {
            None => "RequestBody.empty()".to_string(),
            Some(p) if p.kind == PayloadKind::File => format!("RequestBody.fromFile({})", p.value),
            Some(p) => match length {
                Some(length) => format!("RequestBody.fromInputStream({}, {})", p.value, length),
                None => {
                    self.edits
                        .extend(comments::annotate(self.source, call.span.start, BUFFERING_WARNING));
                    format!(
                        "RequestBody.fromContentProvider(() -> {}, \"application/octet-stream\")",
                        p.value
                    )
                }
            },
        }
    }

    fn check_put_object(&mut self, call: &MethodInvocation) {
        if call.name.name != "putObject" {
            return;
        }
        let Some(target) = call.target.as_deref() else {
            return;
        };
        if self.type_name(target).as_deref() != Some(S3_CLIENT) {
            return;
        }
        match call.args.len() {
            1 => {
                let arg = &call.args.items[0];
                if self.type_name(arg).as_deref() != Some(PUT_OBJECT_REQUEST) {
                    return;
                }
                let (payload, length) = self.payload_for(arg, call.span.start);
                let body = self.request_body(payload.as_ref(), length.as_deref(), call);
                self.edits.push(Edit::insert(
                    arg.span().end,
                    format!(", {}", body),
                    "Pass the payload as a RequestBody",
                ));
            }
            4 => self.check_put_object_with_metadata(call),
            _ => {}
        }
    }

    /// `putObject(bucket, key, inputStream, metadata)`
    fn check_put_object_with_metadata(&mut self, call: &MethodInvocation) {
        let args = &call.args.items;
        let stream_type = self.type_name(&args[2]);
        if !stream_type.as_deref().is_some_and(is_input_stream) {
            return;
        }
        if self.type_name(&args[3]).as_deref() != Some(HEAD_OBJECT_RESPONSE) {
            return;
        }
        let fields = args[3]
            .as_identifier()
            .and_then(|m| self.metadata.get(&m.name))
            .cloned()
            .unwrap_or_default();
        let payload = Payload {
            kind: PayloadKind::InputStream,
            value: self.get_text(args[2].span()).to_string(),
            length: content_length(&fields),
            removal: Span::empty(call.span.start),
            anchor: call.span.start,
        };
        let body = self.request_body(Some(&payload), payload.length.as_deref(), call);
        let request = format!(
            "PutObjectRequest.builder().bucket({}).key({}){}.build()",
            self.get_text(args[0].span()),
            self.get_text(args[1].span()),
            fluent_fields(&fields)
        );
        self.edits.push(Edit::new(
            call.args.inner_span(),
            format!("{}, {}", request, body),
            "Pass a PutObjectRequest and a RequestBody to putObject()",
        ));
        self.imports.maybe_add_import(PUT_OBJECT_REQUEST);
    }

    fn check_upload(&mut self, call: &MethodInvocation) {
        if call.name.name != "upload" || call.args.len() != 1 {
            return;
        }
        let Some(target) = call.target.as_deref() else {
            return;
        };
        if self.type_name(target).as_deref() != Some(S3_TRANSFER_MANAGER) {
            return;
        }
        let arg = &call.args.items[0];
        if self.type_name(arg).as_deref() != Some(PUT_OBJECT_REQUEST) {
            return;
        }

        let (payload, length) = self.payload_for(arg, call.span.start);
        let span = arg.span();
        let (request_type, suffix) = match &payload {
            Some(p) if p.kind == PayloadKind::File => {
                self.edits
                    .push(Edit::new(call.name.span, "uploadFile", "Replace upload() with uploadFile()"));
                ("UploadFileRequest", format!(".source({})", p.value))
            }
            Some(p) => {
                self.edits
                    .extend(comments::annotate(self.source, call.span.start, TM_STREAM_WARNING));
                self.imports.maybe_add_import(ASYNC_REQUEST_BODY);
                let length = length.unwrap_or_else(|| "-1L".to_string());
                (
                    "UploadRequest",
                    format!(
                        ".requestBody(AsyncRequestBody.fromInputStream({}, {}, newExecutorServiceVariableToDefine))",
                        p.value, length
                    ),
                )
            }
            None => {
                self.imports.maybe_add_import(ASYNC_REQUEST_BODY);
                ("UploadRequest", ".requestBody(AsyncRequestBody.empty())".to_string())
            }
        };
        self.edits.push(Edit::insert(
            span.start,
            format!("{}.builder().putObjectRequest(", request_type),
            format!("Wrap the request in an {}", request_type),
        ));
        self.edits.push(Edit::insert(
            span.end,
            format!("){}.build()", suffix),
            format!("Wrap the request in an {}", request_type),
        ));
        self.imports
            .maybe_add_import(&format!("{}.{}", V2_TRANSFER_MODEL, request_type));
    }
}

impl<'a> Visitor<'a> for PutObjectPayloadChecker<'a, '_> {
    fn visit_statement(&mut self, stmt: &'a Stmt, _source: &str) -> bool {
        if self.phase != Phase::Collect {
            return true;
        }
        if let Stmt::Expression {
            expr: Expr::MethodInvocation(call),
            span,
        } = stmt
        {
            if self.check_setter_statement(call, *span) {
                return false;
            }
        }
        true
    }

    fn visit_expression(&mut self, expr: &'a Expr, _source: &str) -> bool {
        if let Expr::MethodInvocation(call) = expr {
            match self.phase {
                Phase::Collect => {
                    self.check_request_payer(call);
                    self.check_chain(call);
                }
                Phase::Attach => {
                    self.check_put_object(call);
                    self.check_upload(call);
                }
            }
        }
        true
    }

    fn enter_scope(&mut self, scope: Scope<'a>) {
        let owner = match scope {
            Scope::Variable { declarator, .. } => Owner::Variable(declarator.name.name.clone()),
            Scope::Assignment { target } => match target.as_identifier() {
                Some(ident) => Owner::Variable(ident.name.clone()),
                None => Owner::Other,
            },
            Scope::Arguments(call) => Owner::Call {
                name: call.name.name.clone(),
                start: call.span.start,
            },
            _ => Owner::Other,
        };
        self.owners.push(owner);
    }

    fn leave_scope(&mut self, _scope: Scope<'a>) {
        self.owners.pop();
    }
}

fn inline_key(call_start: usize) -> String {
    format!("@{}", call_start)
}

fn content_length(fields: &[(String, String)]) -> Option<String> {
    fields
        .iter()
        .find(|(field, _)| field == "contentLength")
        .map(|(_, value)| value.clone())
}

/// `.contentLength(10L).contentType("text/plain")`
fn fluent_fields(fields: &[(String, String)]) -> String {
    fields
        .iter()
        .map(|(field, value)| format!(".{}({})", field, value))
        .collect()
}

/// The statement's span widened to its whole line when nothing else is on it
fn line_span(source: &str, span: Span) -> Span {
    let line_start = source[..span.start].rfind('\n').map_or(0, |i| i + 1);
    if !source[line_start..span.start].trim().is_empty() {
        return span;
    }
    let line_end = source[span.end..]
        .find('\n')
        .map_or(source.len(), |i| span.end + i + 1);
    if !source[span.end..line_end].trim().is_empty() {
        return span;
    }
    Span::new(line_start, line_end)
}

pub struct S3PutObjectPayloadRule;

impl Rule for S3PutObjectPayloadRule {
    fn name(&self) -> &'static str {
        "s3_put_object_payload"
    }

    fn description(&self) -> &'static str {
        "Move PutObjectRequest payloads into RequestBody / Transfer Manager request arguments"
    }

    fn category(&self) -> Category {
        Category::S3
    }

    fn check(&self, unit: &CompilationUnit, source: &str) -> Result<Vec<Edit>, RuleError> {
        Ok(check_s3_put_object_payload(unit, source))
    }
}
