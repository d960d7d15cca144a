use std::sync::atomic::{AtomicUsize, Ordering};

use indoc::indoc;
use saphyr_unity::unity::{
    Camera, GameObject, Light, MeshRenderer, RenderSettings, SceneSettings, Transform,
};
use saphyr_unity::{from_reader, from_str, from_str_with_options, BudgetReport, Catalogue, Options};

const SCENE: &str = indoc! {"
    %YAML 1.1
    %TAG !u! tag:unity3d.com,2011:
    --- !u!29 &1
    SceneSettings:
      m_ObjectHideFlags: 0
      m_PVSData:
      m_PVSObjectsArray: []
      m_PVSPortalsArray: []
      m_OcclusionBakeSettings:
        viewCellSize: 1
        bakeMode: 2
        memoryUsage: 10485760
    --- !u!104 &2
    RenderSettings:
      m_Fog: 0
      m_FogColor: {r: .5, g: .5, b: .5, a: 1}
      m_FogMode: 3
      m_FogDensity: .00999999978
      m_LinearFogStart: 0
      m_LinearFogEnd: 300
      m_AmbientLight: {r: .200000003, g: .200000003, b: .200000003, a: 1}
      m_SkyboxMaterial: {fileID: 0}
      m_HaloStrength: .5
      m_FlareStrength: 1
      m_HaloTexture: {fileID: 0}
      m_SpotCookie: {fileID: 0}
      m_ObjectHideFlags: 0
    --- !u!127 &3
    LevelGameManager:
      m_ObjectHideFlags: 0
    --- !u!196 &4
    NavMeshSettings:
      m_ObjectHideFlags: 0
      m_BuildSettings:
        agentRadius: .5
    --- !u!1 &100
    GameObject:
      m_ObjectHideFlags: 0
      m_PrefabParentObject: {fileID: 0}
      m_PrefabInternal: {fileID: 0}
      serializedVersion: 3
      m_Component:
      - 4: {fileID: 400}
      - 20: {fileID: 2000}
      - 81: {fileID: 8100}
      m_Layer: 0
      m_Name: Main Camera
      m_TagString: MainCamera
      m_Icon: {fileID: 0}
      m_NavMeshLayer: 0
      m_StaticEditorFlags: 0
      m_IsActive: 1
    --- !u!4 &400
    Transform:
      m_ObjectHideFlags: 0
      m_PrefabParentObject: {fileID: 0}
      m_PrefabInternal: {fileID: 0}
      m_GameObject: {fileID: 100}
      m_LocalRotation: {x: 0, y: 0, z: 0, w: 1}
      m_LocalPosition: {x: 0, y: 1, z: -10}
      m_LocalScale: {x: 1, y: 1, z: 1}
      m_Children:
      - {fileID: 401}
      m_Father: {fileID: 0}
    --- !u!20 &2000
    Camera:
      m_ObjectHideFlags: 0
      m_GameObject: {fileID: 100}
      m_Enabled: 1
      serializedVersion: 2
      m_ClearFlags: 1
      m_BackGroundColor: {r: .192156866, g: .301960796, b: .474509805, a: .0196078438}
      m_NormalizedViewPortRect:
        serializedVersion: 2
        x: 0
        y: 0
        width: 1
        height: 1
      near clip plane: .300000012
      far clip plane: 1000
      field of view: 60
      orthographic: 0
      orthographic size: 5
      m_Depth: -1
      m_CullingMask:
        serializedVersion: 2
        m_Bits: 4294967295
      m_RenderingPath: -1
    --- !u!81 &8100
    AudioListener:
      m_ObjectHideFlags: 0
      m_GameObject: {fileID: 100}
      m_Enabled: 1
    --- !u!4 &401 stripped
    Transform:
      m_PrefabParentObject: {fileID: 400000, guid: 0123456789abcdef0123456789abcdef, type: 2}
      m_PrefabInternal: {fileID: 900}
      m_Father: {fileID: 400}
    --- !u!1001 &900
    Prefab:
      m_ObjectHideFlags: 0
      serializedVersion: 2
      m_Modification:
        m_TransformParent: {fileID: 400}
        m_Modifications: []
        m_RemovedComponents: []
      m_ParentPrefab: {fileID: 0}
      m_IsPrefabParent: 0
    --- !u!108 &10800
    Light:
      m_ObjectHideFlags: 0
      m_GameObject: {fileID: 101}
      m_Enabled: 1
      serializedVersion: 3
      m_Type: 1
      m_Color: {r: 1, g: .956862748, b: .839215696, a: 1}
      m_Intensity: .5
      m_Range: 10
      m_SpotAngle: 30
      m_CookieSize: 10
      m_Shadows:
        m_Type: 0
        m_Resolution: -1
        m_Strength: 1
      m_Cookie: {fileID: 0}
      m_DrawHalo: 0
      m_RenderMode: 0
      m_Lightmapping: 1
    --- !u!1 &101
    GameObject:
      m_Component:
      - 4: {fileID: 402}
      - 108: {fileID: 10800}
      m_Layer: 0
      m_Name: Directional light
      m_TagString: Untagged
      m_IsActive: 1
    --- !u!4 &402
    Transform:
      m_GameObject: {fileID: 101}
      m_LocalRotation: {x: .408217937, y: -.234569728, z: .109381661, w: .875426114}
      m_LocalPosition: {x: 0, y: 3, z: 0}
      m_LocalScale: {x: 1, y: 1, z: 1}
      m_Children: []
      m_Father: {fileID: 0}
"};

#[test]
fn loads_a_unity_scene() {
    let scene = from_str(SCENE, &Catalogue::unity()).unwrap();

    // Everything but the NavMeshSettings and Prefab documents.
    assert_eq!(scene.objects.len(), 11);
    assert_eq!(scene.unknown_tags.count("tag:unity3d.com,2011:196"), 1);
    assert_eq!(scene.unknown_tags.count("tag:unity3d.com,2011:1001"), 1);
    assert_eq!(
        scene.unknown_tags.to_string(),
        "Skipped unknown tag tag:unity3d.com,2011:1001 1 time(s)\n\
         Skipped unknown tag tag:unity3d.com,2011:196 1 time(s)\n"
    );

    let camera_object = scene.by_file_id(100).unwrap();
    assert_eq!(camera_object.tag.as_deref(), Some("tag:unity3d.com,2011:1"));
    let game_object = camera_object.downcast_ref::<GameObject>().unwrap();
    assert_eq!(game_object.name, "Main Camera");
    assert_eq!(game_object.tag, "MainCamera");
    assert!(game_object.is_active);
    let components: Vec<(i64, i64)> = game_object.components.iter().collect();
    assert_eq!(components, vec![(4, 400), (20, 2000), (81, 8100)]);

    let camera = scene.by_file_id(2000).unwrap().downcast_ref::<Camera>().unwrap();
    assert!(camera.enabled);
    assert_eq!(camera.clear_flags, 1);
    assert!((camera.near_clip_plane - 0.3).abs() < 1e-6);
    assert_eq!(camera.far_clip_plane, 1000.0);
    assert_eq!(camera.field_of_view, 60.0);
    assert!(!camera.orthographic);
    assert_eq!(camera.depth, -1.0);
    assert_eq!(camera.viewport.width, 1.0);
    assert_eq!(
        camera.culling_mask.get("m_Bits").and_then(|n| n.as_str()),
        Some("4294967295")
    );
    assert_eq!(scene.get(&camera.game_object).unwrap().file_id, Some(100));

    let scene_settings = scene.of_type::<SceneSettings>().next().unwrap();
    assert_eq!(scene_settings.pvs_data, "");
    assert!(scene_settings.pvs_objects.is_empty());

    let settings = scene.of_type::<RenderSettings>().next().unwrap();
    assert!(!settings.fog);
    assert_eq!(settings.fog_mode, 3);
    assert_eq!(settings.linear_fog_end, 300.0);
    assert_eq!(settings.fog_color.a, 1.0);

    let light = scene.of_type::<Light>().next().unwrap();
    assert_eq!(light.light_type, 1);
    assert_eq!(light.intensity, 0.5);
    assert!(!light.draw_halo);
    assert_eq!(scene.get(&light.game_object).unwrap().file_id, Some(101));
}

#[test]
fn transforms_and_stripped_documents() {
    let scene = from_str(SCENE, &Catalogue::unity()).unwrap();
    assert_eq!(scene.unresolved_references, 0);

    let camera_transform = scene.by_file_id(400).unwrap().downcast_ref::<Transform>().unwrap();
    assert_eq!(camera_transform.local_position.z, -10.0);
    assert_eq!(camera_transform.local_rotation.w, 1.0);
    assert_eq!(camera_transform.children.len(), 1);
    assert_eq!(camera_transform.children[0].file_id, 401);
    assert!(!camera_transform.father.is_resolved());

    let stripped = scene.by_file_id(401).unwrap();
    assert_eq!(stripped.anchor.as_deref(), Some("401"));
    let stripped = stripped.downcast_ref::<Transform>().unwrap();
    assert_eq!(stripped.father.file_id, 400);
    assert!(stripped.father.is_resolved());

    let transforms = scene.of_type::<Transform>().count();
    assert_eq!(transforms, 3);
    assert!(scene.of_type::<MeshRenderer>().next().is_none());
}

#[test]
fn strict_loading_reports_undeclared_property() {
    let options = saphyr_unity::options! { ignore_unmatched: false };
    let err = from_str_with_options(SCENE, &Catalogue::unity(), options).unwrap_err();
    match err.root_cause() {
        saphyr_unity::Error::UnknownProperty { class, property, .. } => {
            assert_eq!(*class, "SceneSettings");
            assert_eq!(property, "m_ObjectHideFlags");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

static REPORTED_DOCUMENTS: AtomicUsize = AtomicUsize::new(0);

fn record_report(report: &BudgetReport) {
    REPORTED_DOCUMENTS.store(report.documents, Ordering::SeqCst);
}

#[test]
fn budget_report_callback_sees_every_document() {
    let options = Options {
        budget_report: Some(record_report),
        ..Options::default()
    };
    from_str_with_options(SCENE, &Catalogue::unity(), options).unwrap();
    assert_eq!(REPORTED_DOCUMENTS.load(Ordering::SeqCst), 13);
}

#[test]
fn loads_from_reader() {
    let scene = from_reader(SCENE.as_bytes(), &Catalogue::unity(), Options::default()).unwrap();
    assert_eq!(scene.objects.len(), 11);
}
