//! Unity scene classes and the catalogue binding them to their class ids.
//!
//! Only a representative subset of each class is declared; everything else
//! in a document is skipped. Class ids follow Unity's class ID reference.

use crate::catalogue::{unity_tag, Catalogue};
use crate::component_list::ComponentList;
use crate::decodable;
use crate::schema::TypeDescriptor;
use crate::value::{Color, FileRef, Node, ObjectRef, Quaternion, Rect, Vector3};

decodable! {
    /// Scene graph node owning a list of components.
    pub struct GameObject as "GameObject" {
        pub components: ComponentList => "m_Component": ComponentList,
        pub layer: i32 => "m_Layer": Int32,
        pub name: String => "m_Name": Str,
        pub tag: String => "m_TagString" | "m_Tag": Str,
        pub is_active: bool => "m_IsActive": Bool,
        pub static_editor_flags: i64 => "m_StaticEditorFlags": Int,
        pub prefab_parent: FileRef => "m_PrefabParentObject": FileRef,
        pub prefab_internal: FileRef => "m_PrefabInternal": FileRef,
    }
}

decodable! {
    pub struct Transform as "Transform" {
        pub game_object: ObjectRef => "m_GameObject": Reference,
        pub local_rotation: Quaternion => "m_LocalRotation": Quaternion,
        pub local_position: Vector3 => "m_LocalPosition": Vector3,
        pub local_scale: Vector3 => "m_LocalScale": Vector3,
        pub children: Vec<FileRef> => "m_Children": FileRefs,
        pub father: ObjectRef => "m_Father": Reference,
    }
}

decodable! {
    pub struct Camera as "Camera" {
        pub game_object: ObjectRef => "m_GameObject": Reference,
        pub enabled: bool => "m_Enabled": Bool,
        pub clear_flags: i32 => "m_ClearFlags": Int32,
        pub background_color: Color => "m_BackGroundColor": Color,
        pub viewport: Rect => "m_NormalizedViewPortRect": Rect,
        pub near_clip_plane: f32 => "near clip plane": Float32,
        pub far_clip_plane: f32 => "far clip plane": Float32,
        pub field_of_view: f32 => "field of view": Float32,
        pub orthographic: bool => "orthographic": Bool,
        pub orthographic_size: f32 => "orthographic size": Float32,
        pub depth: f32 => "m_Depth": Float32,
        pub culling_mask: Node => "m_CullingMask": Node,
    }
}

decodable! {
    /// Renderer of class id 23.
    pub struct MeshRenderer as "MeshRenderer" {
        pub game_object: ObjectRef => "m_GameObject": Reference,
        pub enabled: bool => "m_Enabled": Bool,
        pub cast_shadows: bool => "m_CastShadows": Bool,
        pub receive_shadows: bool => "m_ReceiveShadows": Bool,
        pub lightmap_index: i32 => "m_LightmapIndex": Int32,
        pub lightmap_tiling_offset: Node => "m_LightmapTilingOffset": Node,
        pub materials: Vec<FileRef> => "m_Materials": FileRefs,
    }
}

decodable! {
    pub struct SceneSettings as "SceneSettings" {
        pub pvs_data: String => "m_PVSData": Str,
        pub pvs_objects: Vec<FileRef> => "m_PVSObjectsArray": FileRefs,
        pub pvs_portals: Vec<FileRef> => "m_PVSPortalsArray": FileRefs,
        pub occlusion_bake_settings: Node => "m_OcclusionBakeSettings": Node,
    }
}

decodable! {
    pub struct MeshFilter as "MeshFilter" {
        pub game_object: ObjectRef => "m_GameObject": Reference,
        pub mesh: FileRef => "m_Mesh": FileRef,
    }
}

decodable! {
    pub struct MeshCollider as "MeshCollider" {
        pub game_object: ObjectRef => "m_GameObject": Reference,
        pub material: FileRef => "m_Material": FileRef,
        pub is_trigger: bool => "m_IsTrigger": Bool,
        pub enabled: bool => "m_Enabled": Bool,
        pub smooth_sphere_collisions: bool => "m_SmoothSphereCollisions": Bool,
        pub convex: bool => "m_Convex": Bool,
        pub mesh: FileRef => "m_Mesh": FileRef,
    }
}

decodable! {
    pub struct AudioListener as "AudioListener" {
        pub game_object: ObjectRef => "m_GameObject": Reference,
        pub enabled: bool => "m_Enabled": Bool,
    }
}

decodable! {
    pub struct RenderSettings as "RenderSettings" {
        pub fog: bool => "m_Fog": Bool,
        pub fog_color: Color => "m_FogColor": Color,
        pub fog_mode: i32 => "m_FogMode": Int32,
        pub fog_density: f32 => "m_FogDensity": Float32,
        pub linear_fog_start: f32 => "m_LinearFogStart": Float32,
        pub linear_fog_end: f32 => "m_LinearFogEnd": Float32,
        pub ambient_light: Color => "m_AmbientLight": Color,
        pub skybox_material: FileRef => "m_SkyboxMaterial": FileRef,
        pub halo_strength: f32 => "m_HaloStrength": Float32,
        pub flare_strength: f32 => "m_FlareStrength": Float32,
        pub halo_texture: FileRef => "m_HaloTexture": FileRef,
        pub spot_cookie: FileRef => "m_SpotCookie": FileRef,
    }
}

decodable! {
    pub struct Light as "Light" {
        pub game_object: ObjectRef => "m_GameObject": Reference,
        pub enabled: bool => "m_Enabled": Bool,
        pub light_type: i32 => "m_Type": Int32,
        pub color: Color => "m_Color": Color,
        pub intensity: f32 => "m_Intensity": Float32,
        pub range: f32 => "m_Range": Float32,
        pub spot_angle: f32 => "m_SpotAngle": Float32,
        pub cookie_size: f32 => "m_CookieSize": Float32,
        pub shadows: Node => "m_Shadows": Node,
        pub cookie: FileRef => "m_Cookie": FileRef,
        pub draw_halo: bool => "m_DrawHalo": Bool,
        pub render_mode: i32 => "m_RenderMode": Int32,
        pub lightmapping: i32 => "m_Lightmapping": Int32,
    }
}

decodable! {
    pub struct Animation as "Animation" {
        pub game_object: ObjectRef => "m_GameObject": Reference,
        pub enabled: bool => "m_Enabled": Bool,
        pub animation: FileRef => "m_Animation": FileRef,
        pub animations: Vec<FileRef> => "m_Animations": FileRefs,
        pub wrap_mode: i32 => "m_WrapMode": Int32,
        pub play_automatically: bool => "m_PlayAutomatically": Bool,
        pub animate_physics: bool => "m_AnimatePhysics": Bool,
        pub culling_type: i32 => "m_CullingType": Int32,
    }
}

decodable! {
    /// Script component. Serialized script fields are not declared and are
    /// skipped.
    pub struct MonoBehaviour as "MonoBehaviour" {
        pub game_object: ObjectRef => "m_GameObject": Reference,
        pub enabled: bool => "m_Enabled": Bool,
        pub editor_hide_flags: i32 => "m_EditorHideFlags": Int32,
        pub script: FileRef => "m_Script": FileRef,
        pub name: String => "m_Name": Str,
    }
}

decodable! {
    pub struct LevelGameManager as "LevelGameManager" {
        pub object_hide_flags: i32 => "m_ObjectHideFlags": Int32,
    }
}

decodable! {
    pub struct LightmapSettings as "LightmapSettings" {
        pub lightmaps_mode: i32 => "m_LightmapsMode": Int32,
        pub light_probes: FileRef => "m_LightProbes": FileRef,
        pub lightmaps: Node => "m_Lightmaps": Node,
        pub use_dual_lightmaps_in_forward: bool => "m_UseDualLightmapsInForward": Bool,
        pub editor_settings: Node => "m_LightmapEditorSettings": Node,
    }
}

decodable! {
    pub struct ParticleSystem as "ParticleSystem" {
        pub game_object: ObjectRef => "m_GameObject": Reference,
        pub length_in_sec: f32 => "lengthInSec": Float32,
        pub start_delay: f32 => "startDelay": Float32,
        pub speed: f32 => "speed": Float32,
        pub random_seed: i64 => "randomSeed": Int,
        pub looping: bool => "looping": Bool,
        pub prewarm: bool => "prewarm": Bool,
        pub play_on_awake: bool => "playOnAwake": Bool,
        pub move_with_transform: bool => "moveWithTransform": Bool,
        pub initial_module: Node => "InitialModule": Node,
    }
}

decodable! {
    pub struct ParticleSystemRenderer as "ParticleSystemRenderer" {
        pub game_object: ObjectRef => "m_GameObject": Reference,
        pub enabled: bool => "m_Enabled": Bool,
        pub cast_shadows: bool => "m_CastShadows": Bool,
        pub receive_shadows: bool => "m_ReceiveShadows": Bool,
        pub materials: Vec<FileRef> => "m_Materials": FileRefs,
        pub render_mode: i32 => "m_RenderMode": Int32,
        pub max_particle_size: f32 => "m_MaxParticleSize": Float32,
        pub mesh: FileRef => "m_Mesh": FileRef,
    }
}

decodable! {
    pub struct LightProbeGroup as "LightProbeGroup" {
        pub game_object: ObjectRef => "m_GameObject": Reference,
        pub enabled: bool => "m_Enabled": Bool,
        pub source_positions: Node => "m_SourcePositions": Node,
    }
}

/// Class id and descriptor of every class above.
fn unity_classes() -> Vec<(u32, TypeDescriptor)> {
    vec![
        (1, TypeDescriptor::of::<GameObject>()),
        (4, TypeDescriptor::of::<Transform>()),
        (20, TypeDescriptor::of::<Camera>()),
        (23, TypeDescriptor::of::<MeshRenderer>()),
        (29, TypeDescriptor::of::<SceneSettings>()),
        (33, TypeDescriptor::of::<MeshFilter>()),
        (64, TypeDescriptor::of::<MeshCollider>()),
        (81, TypeDescriptor::of::<AudioListener>()),
        (104, TypeDescriptor::of::<RenderSettings>()),
        (108, TypeDescriptor::of::<Light>()),
        (111, TypeDescriptor::of::<Animation>()),
        (114, TypeDescriptor::of::<MonoBehaviour>()),
        (127, TypeDescriptor::of::<LevelGameManager>()),
        (157, TypeDescriptor::of::<LightmapSettings>()),
        (198, TypeDescriptor::of::<ParticleSystem>()),
        (199, TypeDescriptor::of::<ParticleSystemRenderer>()),
        (220, TypeDescriptor::of::<LightProbeGroup>()),
    ]
}

impl Catalogue {
    /// Catalogue of the Unity classes this crate declares, bound to
    /// `tag:unity3d.com,2011:<class id>`.
    pub fn unity() -> Self {
        let mut catalogue = Catalogue::new();
        for (class_id, descriptor) in unity_classes() {
            catalogue.insert_descriptor(unity_tag(class_id), descriptor);
        }
        catalogue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Decodable;

    #[test]
    fn unity_catalogue_binds_every_class_once() {
        let catalogue = Catalogue::unity();
        assert_eq!(catalogue.len(), unity_classes().len());
        assert_eq!(
            catalogue.resolve("tag:unity3d.com,2011:108").map(|t| t.name()),
            Some("Light")
        );
        assert_eq!(
            catalogue.resolve("tag:unity3d.com,2011:23").map(|t| t.name()),
            Some("MeshRenderer")
        );
        assert!(catalogue.resolve("tag:unity3d.com,2011:196").is_none());
    }

    #[test]
    fn property_names_are_unique_per_class() {
        fn check<T: Decodable>() {
            let names: Vec<&str> = T::properties().iter().map(|p| p.name).collect();
            let mut sorted = names.clone();
            sorted.sort_unstable();
            sorted.dedup();
            assert_eq!(sorted.len(), names.len(), "{}", T::CLASS_NAME);
        }
        check::<GameObject>();
        check::<Transform>();
        check::<Camera>();
        check::<RenderSettings>();
        check::<Light>();
        check::<ParticleSystem>();
    }
}
