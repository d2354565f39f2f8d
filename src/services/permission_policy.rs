//! Permission policy for hosted content.
//!
//! Every device or notification permission the hosted site asks for is
//! denied without a prompt. The host engine offers no portable permission
//! callback, so the denial is also expressed as a script that every
//! surface runs before the page's own scripts.

use serde::Serialize;
use tracing::debug;

/// Kinds of permission a page can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionKind {
    Camera,
    Microphone,
    Geolocation,
    Notifications,
    Clipboard,
    Midi,
}

impl PermissionKind {
    pub const ALL: [PermissionKind; 6] = [
        PermissionKind::Camera,
        PermissionKind::Microphone,
        PermissionKind::Geolocation,
        PermissionKind::Notifications,
        PermissionKind::Clipboard,
        PermissionKind::Midi,
    ];

    /// Names used by `navigator.permissions.query`.
    pub fn query_names(&self) -> &'static [&'static str] {
        match self {
            PermissionKind::Camera => &["camera"],
            PermissionKind::Microphone => &["microphone"],
            PermissionKind::Geolocation => &["geolocation"],
            PermissionKind::Notifications => &["notifications", "push"],
            PermissionKind::Clipboard => &["clipboard-read"],
            PermissionKind::Midi => &["midi"],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionDecision {
    Allow,
    Deny,
}

/// Decision for a permission request from `origin`. Always `Deny`.
pub fn decide(kind: PermissionKind, origin: &str) -> PermissionDecision {
    debug!(?kind, origin, "permission request denied");
    PermissionDecision::Deny
}

fn denied_query_names() -> Vec<&'static str> {
    PermissionKind::ALL
        .iter()
        .filter(|k| decide(**k, "*") == PermissionDecision::Deny)
        .flat_map(|k| k.query_names().iter().copied())
        .collect()
}

/// Initialization script that makes the permission APIs report "denied".
pub fn denial_script() -> String {
    let names = serde_json::to_string(&denied_query_names()).unwrap_or_else(|_| "[]".into());
    format!(
        r#"(function(){{
var denied={names};
var reject=function(){{return Promise.reject(new DOMException('Permission denied','NotAllowedError'));}};
try{{if(window.Notification){{Object.defineProperty(Notification,'permission',{{get:function(){{return 'denied';}}}});Notification.requestPermission=function(){{return Promise.resolve('denied');}};}}}}catch(e){{}}
try{{if(navigator.mediaDevices){{navigator.mediaDevices.getUserMedia=reject;navigator.mediaDevices.getDisplayMedia=reject;}}}}catch(e){{}}
try{{if(navigator.geolocation){{var geoErr=function(s,f){{if(f)f({{code:1,message:'User denied Geolocation'}});}};navigator.geolocation.getCurrentPosition=geoErr;navigator.geolocation.watchPosition=function(s,f){{geoErr(s,f);return 0;}};}}}}catch(e){{}}
try{{if(navigator.requestMIDIAccess){{navigator.requestMIDIAccess=reject;}}}}catch(e){{}}
try{{if(navigator.permissions&&navigator.permissions.query){{var q=navigator.permissions.query.bind(navigator.permissions);navigator.permissions.query=function(d){{if(d&&denied.indexOf(d.name)>=0){{return Promise.resolve({{state:'denied',status:'denied',onchange:null}});}}return q(d);}};}}}}catch(e){{}}
}})();"#
    )
}
