/// Number of workgroups needed so every item gets an invocation
pub fn workgroup_count(items: u32, per_workgroup: u32) -> u32 {
    items.div_ceil(per_workgroup)
}

#[cfg(test)]
mod tests {
    use super::workgroup_count;

    #[test]
    fn rounds_partial_workgroups_up() {
        assert_eq!(workgroup_count(1000, 64), 16);
        assert_eq!(workgroup_count(1024, 64), 16);
        assert_eq!(workgroup_count(1025, 64), 17);
        assert_eq!(workgroup_count(1, 64), 1);
    }

    #[test]
    fn no_items_means_no_workgroups() {
        assert_eq!(workgroup_count(0, 64), 0);
    }
}
